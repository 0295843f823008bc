// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::info;
use mandelzoom::cli::{self, MovieConfig};
use mandelzoom::{run_sequence, InProcessLauncher, MandelError, ProcessLauncher, SequenceReport};

fn run(config: &MovieConfig) -> Result<SequenceReport, MandelError> {
    let sequence = config.sequence()?;
    if config.in_process {
        return run_sequence(&InProcessLauncher, &sequence, &config.frame, config.processes);
    }
    let launcher = match &config.renderer {
        Some(path) => ProcessLauncher::new(path.clone()),
        None => ProcessLauncher::sibling(),
    };
    info!("rendering frames with {}", launcher.program().display());
    run_sequence(&launcher, &sequence, &config.frame, config.processes)
}

fn main() {
    cli::init_logging();
    info!("Welcome to mandelmovie. Put -h in the argument to get help.");
    let matches = cli::matches_or_exit(cli::movie_app(), std::env::args_os());
    let config = MovieConfig::from_matches(&matches);
    cli::warn_if_oversubscribed(config.frame.threads * config.processes);

    match run(&config) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(report) => {
            info!(
                "{} of {} frames complete",
                report.completed.len(),
                config.frames
            );
            if !report.is_success() {
                for (frame, e) in &report.failed {
                    eprintln!("mandelmovie: frame {}: {}", frame, e);
                }
                std::process::exit(1);
            }
        }
    }
}
