//! Trace sinks for the update procedure.
//!
//! The evaluator narrates every step it takes to a [`Logger`]. Callers that
//! do not care pass `None` and get the [`NullLogger`] through [`normalize`],
//! so tracing calls never need to be guarded.

use std::cell::{Cell, RefCell};

use crate::log::targets;

const INDENT: &str = "  ";

/// A sink for indented trace output.
///
/// Depth is interior state so that a shared `&dyn Logger` can be threaded
/// through recursive calls.
pub trait Logger {
    fn log(&self, message: &str);

    fn increase_depth(&self) {}

    fn decrease_depth(&self) {}

    fn current_indent(&self) -> String {
        String::new()
    }

    /// Whether messages are kept at all. Callers may skip building
    /// expensive messages when this is false.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _message: &str) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

static NULL_LOGGER: NullLogger = NullLogger;

/// Map an absent logger to the null logger.
pub fn normalize(logger: Option<&dyn Logger>) -> &dyn Logger {
    logger.unwrap_or(&NULL_LOGGER)
}

fn indent_for(depth: usize) -> String {
    INDENT.repeat(depth)
}

// ══════════════════════════════════════════════════════════════════════════════
// BufferLogger
// ══════════════════════════════════════════════════════════════════════════════

/// Captures indented lines in memory.
#[derive(Debug, Default)]
pub struct BufferLogger {
    lines: RefCell<Vec<String>>,
    depth: Cell<usize>,
}

impl BufferLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured messages, each prefixed with the indent in force when
    /// it was logged.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contents(&self) -> String {
        self.lines.borrow().join("\n")
    }

    /// Whether any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
        self.depth.set(0);
    }
}

impl Logger for BufferLogger {
    fn log(&self, message: &str) {
        let line = format!("{}{message}", self.current_indent());
        self.lines.borrow_mut().push(line);
    }

    fn increase_depth(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    fn decrease_depth(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    fn current_indent(&self) -> String {
        indent_for(self.depth.get())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// TraceLogger
// ══════════════════════════════════════════════════════════════════════════════

/// Forwards every message to the `log` facade at trace level.
#[derive(Debug)]
pub struct TraceLogger {
    target: &'static str,
    depth: Cell<usize>,
}

impl TraceLogger {
    pub fn new() -> Self {
        Self::with_target(targets::EVALUATION)
    }

    pub fn with_target(target: &'static str) -> Self {
        Self {
            target,
            depth: Cell::new(0),
        }
    }
}

impl Default for TraceLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TraceLogger {
    fn log(&self, message: &str) {
        log::trace!(target: self.target, "{}{message}", self.current_indent());
    }

    fn increase_depth(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    fn decrease_depth(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    fn current_indent(&self) -> String {
        indent_for(self.depth.get())
    }

    fn is_enabled(&self) -> bool {
        log::log_enabled!(target: self.target, log::Level::Trace)
    }
}
