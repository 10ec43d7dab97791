use std::{
    env,
    io::{self, BufWriter, Write},
    process,
};

use log::{error, info};
use sailsim::{
    config::ScenarioConfig,
    environment::Environment,
    error::{ConfigError, Result},
};

/// Usage: `sail_sim [scenario.yaml] [sail trim (deg)]`
///
/// Runs the scenario and writes a CSV trace of the first vessel to stdout. A
/// sail trim given on the command line overrides the configured one.
fn main() {
    env_logger::init();

    let args = env::args().collect::<Vec<_>>();
    if let Err(err) = run(args.get(1).map(String::as_str), args.get(2).map(String::as_str)) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(scenario_path: Option<&str>, sail_trim: Option<&str>) -> Result<()> {
    let scenario = match scenario_path {
        Some(path) => {
            info!("loading scenario from '{path}'");
            ScenarioConfig::from_yaml_file(path)?
        }
        None => ScenarioConfig::default(),
    };
    let sail_trim = sail_trim
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|err| ConfigError::InvalidParameter {
                    parameter: "sail trim".to_string(),
                    reason: err.to_string(),
                })
        })
        .transpose()?;

    let n_steps = scenario.n_steps()?;
    let time_step = scenario.time_step;
    let mut environment = Environment::from_scenario(&scenario)?;
    if let Some(trim) = sail_trim {
        environment.set_trim_all("sail", trim);
    }

    info!(
        "running {} vessel(s) for {n_steps} steps of {time_step} s",
        environment.vessels().len()
    );

    let mut out = BufWriter::new(io::stdout().lock());
    writeln!(out, "time,x,y,heading,heel,speed")?;
    for _ in 0..n_steps {
        environment.update(time_step);
        if let Some(vessel) = environment.vessels().first() {
            let position = vessel.frame().position;
            writeln!(
                out,
                "{:.3},{:.4},{:.4},{:.3},{:.3},{:.4}",
                environment.time(),
                position[0],
                position[1],
                vessel.heading_deg(),
                vessel.heel_deg(),
                vessel.speed()
            )?;
        }
    }
    out.flush()?;

    info!("finished at t = {:.2} s", environment.time());
    Ok(())
}
