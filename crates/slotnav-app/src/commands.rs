use anyhow::{Context, Result, bail};
use slotnav_core::{Direction, OpenFlags, OpenMode, TransitionController, WindowKind};
use slotnav_types::{Location, SlotId};
use slotnav_vfs::MemoryVfs;

use crate::views::LoggingViewFactory;

pub type Controller = TransitionController<MemoryVfs, LoggingViewFactory>;

/// One line of the session script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go { target: String, new_tab: bool },
    Spatial(String),
    Back(usize),
    Forward(usize),
    Up,
    Home,
    Reload,
    Stop,
    View(String),
    Tab(u64),
    CloseTab,
    Remove(String),
    Trash(String),
    Show,
}

impl Command {
    /// Parse a script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = || -> Result<String> {
            if rest.is_empty() {
                bail!("{word}: missing argument");
            }
            Ok(rest.to_string())
        };
        let count = || -> Result<usize> {
            if rest.is_empty() {
                Ok(0)
            } else {
                rest.parse().with_context(|| format!("{word}: bad distance {rest:?}"))
            }
        };
        let cmd = match word {
            "go" | "cd" => Command::Go {
                target: arg()?,
                new_tab: false,
            },
            "open-tab" => Command::Go {
                target: arg()?,
                new_tab: true,
            },
            "spatial" => Command::Spatial(arg()?),
            "back" => Command::Back(count()?),
            "forward" => Command::Forward(count()?),
            "up" => Command::Up,
            "home" => Command::Home,
            "reload" => Command::Reload,
            "stop" => Command::Stop,
            "view" => Command::View(arg()?),
            "tab" => Command::Tab(
                arg()?
                    .parse()
                    .with_context(|| format!("tab: bad slot id {rest:?}"))?,
            ),
            "close-tab" => Command::CloseTab,
            "rm" => Command::Remove(arg()?),
            "trash" => Command::Trash(arg()?),
            "show" => Command::Show,
            other => bail!("unknown command: {other}"),
        };
        Ok(Some(cmd))
    }
}

/// Answer provider requests and drain the mailbox until both are idle.
/// Returns how many messages were delivered.
pub fn pump(ctl: &mut Controller) -> usize {
    let mut total = 0;
    loop {
        let answered = ctl.provider_mut().run_pending();
        let delivered = ctl.poll();
        total += delivered;
        if answered == 0 && delivered == 0 {
            return total;
        }
    }
}

/// Run `cmd` against the active slot. Returns the slot that is active
/// afterwards.
pub fn execute(ctl: &mut Controller, slot: SlotId, cmd: Command) -> Result<SlotId> {
    let slot = match cmd {
        Command::Go { target, new_tab } => {
            ctl.go_to(slot, Location::parse(&target)?, new_tab)?
        },
        Command::Spatial(target) => ctl.open_location(
            slot,
            Location::parse(&target)?,
            OpenMode::InSpatial,
            OpenFlags::default(),
            Vec::new(),
        )?,
        Command::Back(distance) => ctl.go_back_or_forward(slot, Direction::Back, distance, false)?,
        Command::Forward(distance) => {
            ctl.go_back_or_forward(slot, Direction::Forward, distance, false)?
        },
        Command::Up => ctl.go_up(slot, OpenFlags::default())?,
        Command::Home => ctl.go_home(slot, false)?,
        Command::Reload => {
            ctl.reload(slot)?;
            slot
        },
        Command::Stop => {
            ctl.stop_loading(slot)?;
            slot
        },
        Command::View(id) => {
            ctl.set_content_view(slot, &id)?;
            slot
        },
        Command::Tab(id) => {
            let target = SlotId(id);
            let window = ctl
                .slot(target)
                .map(|s| s.window())
                .with_context(|| format!("no slot {id}"))?;
            ctl.set_active_slot(window, target)?;
            target
        },
        Command::CloseTab => {
            let window = ctl
                .slot(slot)
                .map(|s| s.window())
                .with_context(|| format!("no slot {slot}"))?;
            ctl.close_slot(slot)?;
            match ctl.window(window).and_then(|w| w.active_slot()) {
                Some(next) => next,
                None => first_navigation_slot(ctl).context("no windows left")?,
            }
        },
        Command::Remove(path) => {
            ctl.provider_mut().remove(&path)?;
            slot
        },
        Command::Trash(path) => {
            ctl.provider_mut().trash(&path)?;
            slot
        },
        Command::Show => {
            println!("{}", snapshot_json(ctl)?);
            slot
        },
    };
    pump(ctl);
    // The command may have closed the window holding `slot`.
    match ctl.slot(slot) {
        Some(_) => Ok(slot),
        None => first_navigation_slot(ctl).context("no windows left"),
    }
}

fn first_navigation_slot(ctl: &Controller) -> Option<SlotId> {
    ctl.windows()
        .find(|w| w.kind() == WindowKind::Navigation)
        .or_else(|| ctl.windows().next())
        .and_then(|w| w.active_slot())
}

/// Every window and slot as pretty JSON.
pub fn snapshot_json(ctl: &Controller) -> Result<String> {
    let windows: Vec<_> = ctl.windows().collect();
    let slots: Vec<_> = ctl.slots().map(|s| s.snapshot()).collect();
    let mut doc = serde_json::Map::new();
    doc.insert("windows".into(), serde_json::to_value(windows)?);
    doc.insert("slots".into(), serde_json::to_value(slots)?);
    Ok(serde_json::to_string_pretty(&doc)?)
}
