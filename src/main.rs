use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rtalgs::cli::Cli;
use rtalgs::sim::Simulator;
use rtalgs::taskset::TaskSet;
use rtalgs::{config, render};

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("rtalgs: {message}");
            ExitCode::FAILURE
        }
    }
}

fn install_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let algorithms = cli.algorithms().map_err(|e| e.to_string())?;

    for path in &cli.taskset_files {
        info!(path = %path.display(), "loading task set");
        let parsed = config::load(path).map_err(|e| e.to_string())?;

        for algorithm in &algorithms {
            let taskset = TaskSet::build(parsed.tasks.clone(), parsed.max_time)
                .map_err(|e| e.to_string())?;
            if taskset.max_time_below_hyperperiod {
                tracing::warn!(
                    max_time = taskset.max_time,
                    "max_time is below the hyperperiod; proceeding anyway"
                );
            }

            let (sim, report) = Simulator::new(taskset.clone(), *algorithm).run();
            if let Some(title) = &parsed.title {
                println!("# {title}");
            }
            println!(
                "{}",
                render::render(&taskset, &report, &sim, cli.width, cli.per_task_rows)
            );
        }
    }

    Ok(())
}
