//! The buffering appendable (spec.md §3 "Buffering appendable"): an output
//! sink that also accepts logging-block annotations, with a soft output
//! limit used to signal back-pressure (spec.md §5 "Suspension points").

/// Whether a write succeeded outright or the sink wants the caller to back
/// off (spec.md §4.5 "appendable back-pressure via `limited`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Ok,
    SoftLimitReached,
}

/// One logging-block lifecycle event (spec.md §4.5 "Logging blocks").
/// Always recorded, even while the block's own text is suppressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Enter { log_only: bool },
    Exit,
}

pub trait Appendable {
    fn write(&mut self, text: &str) -> WriteOutcome;
    fn enter_block(&mut self, log_only: bool);
    fn exit_block(&mut self);
}

/// The reference `Appendable` implementation: buffers everything written
/// to an in-memory string, applying the log-only suppression rule
/// (spec.md §4.5 "Logging blocks", §8 boundary scenario 6) and reporting
/// back-pressure once a configured soft byte limit is exceeded.
#[derive(Debug, Default)]
pub struct BufferingAppendable {
    output: String,
    events: Vec<LogEvent>,
    /// Per-active-block log-only flags; text is suppressed whenever any
    /// entry here is `true`; regular blocks nested inside a log-only block
    /// inherit the suppression, but their own events still fire
    /// (spec.md: "Regular blocks nested inside a log-only block also
    /// become suppressed (text), but their logging events still fire").
    block_stack: Vec<bool>,
    soft_limit: Option<usize>,
}

impl BufferingAppendable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_soft_limit(soft_limit: usize) -> Self {
        Self {
            soft_limit: Some(soft_limit),
            ..Self::default()
        }
    }

    fn is_suppressed(&self) -> bool {
        self.block_stack.iter().any(|&log_only| log_only)
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }
}

impl Appendable for BufferingAppendable {
    fn write(&mut self, text: &str) -> WriteOutcome {
        if !self.is_suppressed() {
            self.output.push_str(text);
        }
        match self.soft_limit {
            Some(limit) if self.output.len() >= limit => WriteOutcome::SoftLimitReached,
            _ => WriteOutcome::Ok,
        }
    }

    fn enter_block(&mut self, log_only: bool) {
        log::trace!("logging block enter (log_only={log_only})");
        self.events.push(LogEvent::Enter { log_only });
        self.block_stack.push(log_only);
    }

    fn exit_block(&mut self) {
        log::trace!("logging block exit");
        self.events.push(LogEvent::Exit);
        self.block_stack.pop();
    }
}

