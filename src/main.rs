mod initialization;
mod solver;

use std::env;

use anyhow::{Context, Result, bail};
use log::info;

use boundary_composition::boundary::{create_boundary_composition_model, parse_fixed_boundary_indicators};
use boundary_composition::io::param_parser::ParameterHandler;
use boundary_composition::io::sample_points::parse_sample_points;
use boundary_composition::io::write_to_csv::write_to_csv;
use boundary_composition::simulator::SimulatorContext;

use crate::initialization::{initialize_params_by_file, initialize_run_params};
use crate::solver::Solver;

const DEFAULT_PARAMETER_FILE: &str = "inputs/boundary_composition.json";

fn run<const DIM: usize>(prm: &mut ParameterHandler) -> Result<()> {
    let run_params = initialize_run_params(prm)?;
    let context = SimulatorContext::<DIM>::parse_parameters(prm)?;
    let model = create_boundary_composition_model(prm, &context)?;
    let fixed_boundary_ids = parse_fixed_boundary_indicators(prm, context.geometry.as_ref())?;
    let sample_points = parse_sample_points(&run_params.sample_points, context.geometry.as_ref())?;

    let mut solver = Solver {
        model,
        fixed_boundary_ids,
        sample_points,
        n_fields: context.n_compositional_fields,
        run_params: &run_params,
    };
    let samples = solver.solve().context("boundary composition evaluation failed")?;
    write_to_csv(&samples, &run_params.output_file)
        .with_context(|| format!("cannot write {}", run_params.output_file))?;
    info!("wrote {} samples to {}", samples.len(), run_params.output_file);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--list-parameters") {
        let mut prm = ParameterHandler::new();
        initialization::declare_parameters(&mut prm, 2);
        for (path, default, documentation) in prm.documentation() {
            println!("{path} = {default}\n    {documentation}");
        }
        return Ok(());
    }

    let file_path = arg.unwrap_or_else(|| DEFAULT_PARAMETER_FILE.to_string());
    let (mut prm, dim) = initialize_params_by_file(&file_path)
        .with_context(|| format!("cannot set up parameters from {file_path}"))?;
    match dim {
        2 => run::<2>(&mut prm),
        3 => run::<3>(&mut prm),
        _ => bail!("dimension {dim} is not supported"),
    }
}
