//! slotnav command-line driver.
//!
//! Builds a demo in-memory file tree, opens one navigation window at the
//! home location and then runs a session script, one command per line,
//! read from the file named by the second argument or from stdin. `show`
//! prints every window and slot as JSON.
//!
//! Usage: `slotnav-app [config.toml|-] [script]`. The configuration path
//! may also come from `SLOTNAV_CONFIG`.

mod commands;
mod views;
mod vfs_setup;

use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};

use commands::{Command, Controller};
use slotnav_core::{NavEvent, NavObserver, TransitionController, WindowKind};
use slotnav_types::NavConfig;
use slotnav_vfs::MemoryVfs;
use views::LoggingViewFactory;

/// Logs controller events the way a shell would surface them.
struct EventPrinter;

impl NavObserver for EventPrinter {
    fn notify(&mut self, event: &NavEvent) {
        match event {
            NavEvent::LocationChanged { slot, location, .. } => {
                log::info!("{slot}: now showing {location}");
            },
            NavEvent::DisplayFailure(f) => {
                log::warn!("{}: {} {}", f.slot, f.message, f.detail);
            },
            NavEvent::MediaDetected {
                mount,
                content_types,
                ..
            } => {
                log::info!("media on {}: {}", mount.name, content_types.join(", "));
            },
            NavEvent::TrashBar { slot } => log::info!("{slot}: showing trash"),
            other => log::debug!("{other:?}"),
        }
    }
}

fn load_config() -> Result<NavConfig> {
    let path = std::env::args()
        .nth(1)
        .filter(|a| a != "-")
        .or_else(|| std::env::var("SLOTNAV_CONFIG").ok())
        .map(PathBuf::from);
    match path {
        Some(path) => NavConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(NavConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!(
        "Starting slotnav (home {}, default view {})",
        config.home,
        config.default_view
    );

    let mut vfs = MemoryVfs::new();
    vfs_setup::populate_demo_vfs(&mut vfs)?;

    let mut ctl: Controller = TransitionController::new(config, vfs, LoggingViewFactory::new());
    ctl.add_observer(Box::new(EventPrinter));

    let (window, mut slot) = ctl.open_window(WindowKind::Navigation);
    ctl.go_home(slot, false)?;
    commands::pump(&mut ctl);
    ctl.mark_shown(window)?;

    let reader: Box<dyn BufRead> = match std::env::args().nth(2) {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(&path).with_context(|| format!("opening script {path}"))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("line {}: {e:#}", n + 1);
                continue;
            },
        };
        match commands::execute(&mut ctl, slot, cmd) {
            Ok(next) => slot = next,
            Err(e) => {
                log::warn!("line {}: {e:#}", n + 1);
                if ctl.windows().next().is_none() {
                    break;
                }
            },
        }
        // Windows opened by the command are on screen once it returns.
        let unshown: Vec<_> = ctl
            .windows()
            .filter(|w| !w.is_shown())
            .map(|w| w.id())
            .collect();
        for id in unshown {
            ctl.mark_shown(id)?;
        }
    }

    log::info!(
        "{} views created; final state:",
        ctl.factory().created()
    );
    println!("{}", commands::snapshot_json(&ctl)?);
    Ok(())
}
