use std::io;

use anyhow::Result;
use log::{error, info, warn};

use mctrl300_control::config::Config;
use mctrl300_control::console::{self, ConsoleView};
use mctrl300_control::discover::SystemScanner;
use mctrl300_control::driver::DryRunFactory;
use mctrl300_control::link::SystemOpener;
use mctrl300_control::logging;
use mctrl300_control::{Collaborators, Controller};

fn main() -> Result<()> {
    let config = Config::from_env()?;

    let _log_handle = match logging::init(&config.log) {
        Ok(handle) => Some(handle),
        Err(e) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error"))
                .init();
            warn!("file logging unavailable ({e}), logging to stderr only");
            None
        }
    };
    info!("mctrl300-control {} starting", env!("CARGO_PKG_VERSION"));

    let collaborators = Collaborators {
        scanner: Box::new(SystemScanner::default()),
        opener: Box::new(SystemOpener::new(config.serial)),
        drivers: Box::new(DryRunFactory {
            initial_brightness: config.dry_run_brightness,
        }),
    };

    let view = ConsoleView::new(io::stdout());
    let mut controller = Controller::new(view, collaborators)?;

    if let Err(e) = console::run(&mut controller, io::stdin().lock()) {
        error!("{e:#}");
        controller.shutdown();
        return Err(e);
    }
    Ok(())
}
