use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use metro_sim::loader::load_file;
use metro_sim::report::TimetableReport;
use metro_sim::sim::{Replay, SimConfig, Simulation};

const USAGE: &str = "usage: metro-sim <scenario-file> [--json]";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut path = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("{USAGE}");
                return ExitCode::from(2);
            }
        }
    }
    let Some(path) = path else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(&path, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = load_file(path)?;
    let config = SimConfig::from_env();
    let network = &scenario.network;

    let mut sim = Simulation::new(network, scenario.start, scenario.end, scenario.trains, config)?;
    let ticks = sim.run()?;
    info!(ticks, trains = scenario.trains, "exploration finished");

    let timetable = Replay::new(
        network,
        scenario.start,
        scenario.end,
        sim.replay_trains(),
        config,
    )?
    .run()?;
    info!(cost = timetable.cost, "replay finished");

    let report = TimetableReport::new(network, &timetable);
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
