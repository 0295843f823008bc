// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::info;
use mandelzoom::cli::{self, RenderConfig};
use mandelzoom::render_to_file;

fn main() {
    cli::init_logging();
    let matches = cli::matches_or_exit(cli::render_app(), std::env::args_os());
    let config = RenderConfig::from_matches(&matches);

    info!(
        "mandel: x={} y={} scale={} max={} outfile={}",
        config.center.re, config.center.im, config.scale, config.max_iterations, config.output
    );
    cli::warn_if_oversubscribed(config.threads);

    let result = config
        .request()
        .and_then(|request| render_to_file(&request, &config.output));

    if let Err(e) = result {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
