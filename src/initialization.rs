use std::path::Path;

use boundary_composition::boundary;
use boundary_composition::error::ConfigError;
use boundary_composition::io::param_parser::{ParameterHandler, Pattern};
use boundary_composition::simulator;

pub struct RunParameters {
    pub end_time: f64,
    pub time_step: f64,
    pub sample_points: String,
    pub output_file: String,
}

fn declare_run_parameters(prm: &mut ParameterHandler) {
    prm.enter_subsection("Time stepping");
    prm.declare_entry("End time", "0", Pattern::Double, "Last model time to evaluate.");
    prm.declare_entry("Time step", "1", Pattern::Double, "Spacing of the evaluated times.");
    prm.leave_subsection();
    prm.enter_subsection("Output");
    prm.declare_entry(
        "Sample points",
        "",
        Pattern::Anything,
        "Boundary points to evaluate, as 'boundary: coordinates' separated by semicolons.",
    );
    prm.declare_entry(
        "Output file",
        "boundary_composition.csv",
        Pattern::Anything,
        "CSV file receiving the evaluated boundary compositions.",
    );
    prm.leave_subsection();
}

pub fn declare_parameters(prm: &mut ParameterHandler, dim: usize) {
    simulator::declare_parameters(prm);
    if dim == 3 {
        boundary::declare_parameters::<3>(prm);
    } else {
        boundary::declare_parameters::<2>(prm);
    }
    declare_run_parameters(prm);
}

/// Read a parameter file and return the handler together with the
/// dimension it asks for. Entries whose defaults depend on the dimension are
/// declared again once the dimension is known.
pub fn initialize_params_by_file<P: AsRef<Path>>(
    file_path: P,
) -> Result<(ParameterHandler, usize), ConfigError> {
    let mut prm = ParameterHandler::new();
    declare_parameters(&mut prm, 2);
    prm.read_json_file(file_path)?;
    let dim = prm.get_integer("Dimension")? as usize;
    if dim != 2 {
        declare_parameters(&mut prm, dim);
    }
    Ok((prm, dim))
}

pub fn initialize_run_params(prm: &mut ParameterHandler) -> Result<RunParameters, ConfigError> {
    prm.enter_subsection("Time stepping");
    let times = prm
        .get_double("End time")
        .and_then(|end_time| Ok((end_time, prm.get_double("Time step")?)));
    prm.leave_subsection();
    prm.enter_subsection("Output");
    let output = prm
        .get("Sample points")
        .and_then(|points| Ok((points, prm.get("Output file")?)));
    prm.leave_subsection();

    let (end_time, time_step) = times?;
    let (sample_points, output_file) = output?;
    if !(time_step > 0.0) {
        return Err(ConfigError::InvalidValue {
            key: "Time stepping/Time step".to_string(),
            value: time_step.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(RunParameters {
        end_time,
        time_step,
        sample_points,
        output_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_dimensional_defaults() {
        let mut prm = ParameterHandler::new();
        declare_parameters(&mut prm, 2);
        prm.read_json_str(r#"{"Dimension": 3}"#).unwrap();
        declare_parameters(&mut prm, 3);
        prm.enter_subsection("Boundary composition model");
        prm.enter_subsection("Function");
        assert_eq!(prm.get("Variable names").unwrap(), "x,y,z,t");
    }

    #[test]
    fn test_run_parameters() {
        let mut prm = ParameterHandler::new();
        declare_parameters(&mut prm, 2);
        prm.read_json_str(r#"{"Time stepping": {"End time": 2, "Time step": 0.5}}"#)
            .unwrap();
        let run = initialize_run_params(&mut prm).unwrap();
        assert_eq!(run.end_time, 2.0);
        assert_eq!(run.time_step, 0.5);
        assert_eq!(run.output_file, "boundary_composition.csv");

        prm.set("Time stepping/Time step", "0").unwrap();
        assert!(initialize_run_params(&mut prm).is_err());
    }
}
