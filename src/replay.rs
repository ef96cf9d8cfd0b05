//! Recorded touch/scroll trace replay.
//!
//! Used to tune thresholds against real captures. One command per line:
//!
//! ```text
//! # t_ms command args...
//! 0    geometry 800 800        # item extent, viewport extent, optional spacing
//! 10   down 100 300
//! 26   move 120 302
//! 42   up 180 304
//! 50   cancel
//! 60   scroll 812.5
//! 200  tick
//! ```
//!
//! Timestamps are milliseconds from the start of the trace and must not go
//! backwards. Blank lines and `#` comments are ignored.

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use tracing::debug;

use crate::config::ViewerConfig;
use crate::gesture::{GestureIntent, Point};
use crate::layout::PageGeometry;
use crate::models::MediaItem;
use crate::ui::{PanelToggle, ViewerController};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceCommand {
    Geometry(PageGeometry),
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel,
    Scroll(f64),
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceEntry {
    pub at: Duration,
    pub command: TraceCommand,
}

/// Everything the controller reported, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    ActiveIndex(usize),
    Gesture(GestureIntent),
    Closed,
    Panel(PanelToggle),
    Prefetch(Vec<String>),
}

impl fmt::Display for ViewerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveIndex(index) => write!(f, "index {index}"),
            Self::Gesture(intent) => write!(f, "gesture {intent}"),
            Self::Closed => f.write_str("close"),
            Self::Panel(toggle) => match toggle {
                PanelToggle::Opened(target) => write!(f, "panel open {}", target.item_id),
                PanelToggle::Closed => f.write_str("panel closed"),
            },
            Self::Prefetch(ids) => write!(f, "prefetch {}", ids.join(",")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub item_count: usize,
    pub initial_index: usize,
    pub config: ViewerConfig,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            item_count: 10,
            initial_index: 0,
            config: ViewerConfig::default(),
        }
    }
}

/// Read and parse a trace file.
pub fn load_trace(path: &Path) -> Result<Vec<TraceEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace {}", path.display()))?;
    parse_trace(&text).with_context(|| format!("Invalid trace {}", path.display()))
}

pub fn parse_trace(text: &str) -> Result<Vec<TraceEntry>> {
    let mut entries = Vec::new();
    let mut last_at = Duration::ZERO;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let entry = parse_line(line).with_context(|| format!("line {}: {:?}", line_no + 1, raw))?;
        if entry.at < last_at {
            bail!(
                "line {}: timestamp {}ms goes backwards (previous {}ms)",
                line_no + 1,
                entry.at.as_millis(),
                last_at.as_millis()
            );
        }
        last_at = entry.at;
        entries.push(entry);
    }

    Ok(entries)
}

fn parse_line(line: &str) -> Result<TraceEntry> {
    let mut fields = line.split_whitespace();
    let at: u64 = fields
        .next()
        .ok_or_else(|| anyhow!("missing timestamp"))?
        .parse()
        .context("timestamp must be whole milliseconds")?;
    let name = fields.next().ok_or_else(|| anyhow!("missing command"))?;
    let args = fields
        .map(|f| f.parse::<f64>().with_context(|| format!("bad number {f:?}")))
        .collect::<Result<Vec<_>>>()?;

    let command = match (name, args.as_slice()) {
        ("geometry", &[item, viewport]) => TraceCommand::Geometry(PageGeometry::new(item, 0.0, viewport)),
        ("geometry", &[item, viewport, spacing]) => {
            TraceCommand::Geometry(PageGeometry::new(item, spacing, viewport))
        }
        ("down", &[x, y]) => TraceCommand::Down(Point::new(x, y)),
        ("move", &[x, y]) => TraceCommand::Move(Point::new(x, y)),
        ("up", &[x, y]) => TraceCommand::Up(Point::new(x, y)),
        ("cancel", &[]) => TraceCommand::Cancel,
        ("scroll", &[offset]) => TraceCommand::Scroll(offset),
        ("tick", &[]) => TraceCommand::Tick,
        (name, args) => bail!("unknown command {name:?} with {} argument(s)", args.len()),
    };

    Ok(TraceEntry {
        at: Duration::from_millis(at),
        command,
    })
}

/// Drive a controller over synthetic items and collect what it emits,
/// tagged with the trace time of the command that caused it.
pub fn replay(trace: &[TraceEntry], options: &ReplayOptions) -> Vec<(Duration, ViewerEvent)> {
    let items = (0..options.item_count)
        .map(|i| MediaItem::new(format!("item-{i}"), format!("memory://item-{i}"), "replay"))
        .collect();
    let mut controller = ViewerController::new(
        items,
        options.initial_index,
        "replay",
        None,
        options.config.clone(),
    );

    let sink: Rc<RefCell<Vec<ViewerEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let log = sink.clone();
    controller.connect_active_index_changed(move |i| log.borrow_mut().push(ViewerEvent::ActiveIndex(i)));
    let log = sink.clone();
    controller.connect_gesture_classified(move |g| log.borrow_mut().push(ViewerEvent::Gesture(g)));
    let log = sink.clone();
    controller.connect_close(move || log.borrow_mut().push(ViewerEvent::Closed));
    let log = sink.clone();
    controller.connect_panel_toggle(move |p| log.borrow_mut().push(ViewerEvent::Panel(p.clone())));
    let log = sink.clone();
    controller.connect_prefetch(move |items| {
        log.borrow_mut()
            .push(ViewerEvent::Prefetch(items.iter().map(|i| i.id.clone()).collect()))
    });

    let base = Instant::now();
    let mut out = Vec::new();
    controller.mount();
    out.extend(sink.borrow_mut().drain(..).map(|e| (Duration::ZERO, e)));

    for entry in trace {
        let now = base + entry.at;
        match entry.command {
            TraceCommand::Geometry(geometry) => controller.set_geometry(geometry, now),
            TraceCommand::Down(point) => controller.on_touch_start(point),
            TraceCommand::Move(point) => controller.on_touch_move(point),
            TraceCommand::Up(point) => {
                controller.on_touch_end(point, now);
            }
            TraceCommand::Cancel => {
                controller.on_touch_cancel(now);
            }
            TraceCommand::Scroll(offset) => controller.on_scroll(offset, now),
            TraceCommand::Tick => controller.poll(now),
        }
        out.extend(sink.borrow_mut().drain(..).map(|e| (entry.at, e)));

        if controller.is_closed() {
            debug!(at_ms = entry.at.as_millis() as u64, "Viewer closed, stopping replay");
            break;
        }
    }

    out
}
