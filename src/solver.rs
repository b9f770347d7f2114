use std::collections::BTreeSet;

use log::{info, warn};
use nalgebra::Point;

use boundary_composition::boundary::{BoundaryComposition, BoundaryCompositionModel};
use boundary_composition::error::EvaluationError;
use boundary_composition::geometry::BoundaryId;
use boundary_composition::io::write_to_csv::BoundarySample;

use crate::initialization::RunParameters;

/// Drives a boundary composition model through time the way a solver's
/// time loop does: update once per step, then evaluate every sample point.
pub struct Solver<'a, const DIM: usize> {
    pub model: BoundaryCompositionModel<DIM>,
    pub fixed_boundary_ids: BTreeSet<BoundaryId>,
    pub sample_points: Vec<(BoundaryId, Point<f64, DIM>)>,
    pub n_fields: usize,
    pub run_params: &'a RunParameters,
}

impl<'a, const DIM: usize> Solver<'a, DIM> {
    pub fn solve(&mut self) -> Result<Vec<BoundarySample>, EvaluationError> {
        let min_composition = self.model.minimal_composition(&self.fixed_boundary_ids);
        let max_composition = self.model.maximal_composition(&self.fixed_boundary_ids);
        info!("composition bounds on fixed boundaries: [{min_composition}, {max_composition}]");

        let mut samples = Vec::new();
        let mut curr_step = 0;
        loop {
            let curr_time = (curr_step as f64 * self.run_params.time_step).min(self.run_params.end_time);
            self.model.update(curr_time);
            for (boundary_id, position) in &self.sample_points {
                if !self.fixed_boundary_ids.is_empty()
                    && !self.fixed_boundary_ids.contains(boundary_id)
                {
                    continue;
                }
                for component in 0..self.n_fields {
                    let composition =
                        self.model
                            .boundary_composition(*boundary_id, position, component)?;
                    if composition < min_composition || composition > max_composition {
                        warn!(
                            "t = {curr_time}: composition {composition} of field {component} on \
                             boundary {boundary_id} lies outside [{min_composition}, {max_composition}]"
                        );
                    }
                    samples.push(BoundarySample::new(
                        curr_time,
                        *boundary_id,
                        position.coords.as_slice(),
                        component,
                        composition,
                    ));
                }
            }
            info!("step {curr_step}: t = {curr_time}");
            if curr_time >= self.run_params.end_time {
                break;
            }
            curr_step += 1;
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundary_composition::boundary::FunctionBoundary;
    use boundary_composition::coordinates::CoordinateSystem;
    use boundary_composition::function_parser::ParsedFunction;
    use boundary_composition::geometry::{BoxGeometry, GeometryModel};
    use hashbrown::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_steps_reach_end_time() {
        let geometry: Arc<dyn GeometryModel<2>> =
            Arc::new(BoxGeometry::<2>::new([0.0; 2], [1.0; 2]).unwrap());
        let function = ParsedFunction::new("x,y,t", "x * t", &HashMap::new(), 1).unwrap();
        let model = BoundaryCompositionModel::Function(FunctionBoundary::new(
            function,
            0.0,
            1.0,
            CoordinateSystem::Cartesian,
            geometry,
        ));
        let run_params = RunParameters {
            end_time: 1.0,
            time_step: 0.4,
            sample_points: String::new(),
            output_file: String::new(),
        };
        let mut solver = Solver {
            model,
            fixed_boundary_ids: BTreeSet::from([3]),
            sample_points: vec![(3, Point::from([0.5, 1.0])), (2, Point::from([0.5, 0.0]))],
            n_fields: 1,
            run_params: &run_params,
        };
        let samples = solver.solve().unwrap();
        let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 0.4, 0.8, 1.0]);
        assert!(samples.iter().all(|s| s.boundary == 3));
        assert_eq!(samples[3].composition, 0.5);
    }
}
