use super::*;
use crate::trace::TraceLog;

/// Timing knobs of the navigation engine, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Pause after every dispatched command before control returns.
    pub settle_ms: i64,
    /// Gap between two focus reads while waiting for a change.
    pub poll_interval_ms: i64,
    /// How long a focus change is awaited before it counts as a stall.
    pub focus_timeout_ms: i64,
    /// Hold duration used by long-press gestures.
    pub long_press_ms: i64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            poll_interval_ms: 50,
            focus_timeout_ms: 1_000,
            long_press_ms: 1_000,
        }
    }
}

impl NavigatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.settle_ms < 0 {
            return Err(Error::InvalidConfig(
                "settle_ms requires non-negative milliseconds".into(),
            ));
        }
        if self.poll_interval_ms < 1 {
            return Err(Error::InvalidConfig(
                "poll_interval_ms requires at least 1 millisecond".into(),
            ));
        }
        if self.focus_timeout_ms < 0 {
            return Err(Error::InvalidConfig(
                "focus_timeout_ms requires non-negative milliseconds".into(),
            ));
        }
        if self.long_press_ms < 1 {
            return Err(Error::InvalidConfig(
                "long_press_ms requires at least 1 millisecond".into(),
            ));
        }
        Ok(())
    }
}

/// Drives one remote-controlled UI session.
///
/// The navigator owns its session exclusively: commands are issued strictly
/// one after another and focus is only ever read back through a
/// [`FocusAccessor`].
#[derive(Debug)]
pub struct Navigator<S> {
    pub(crate) session: S,
    pub(crate) config: NavigatorConfig,
    pub(crate) trace: TraceLog,
    pub(crate) trace_input: bool,
    pub(crate) trace_focus: bool,
    pub(crate) trace_search: bool,
}

impl<S: RemoteSession> Navigator<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            config: NavigatorConfig::default(),
            trace: TraceLog::default(),
            trace_input: true,
            trace_focus: true,
            trace_search: true,
        }
    }

    pub fn with_config(session: S, config: NavigatorConfig) -> Result<Self> {
        config.validate()?;
        let mut navigator = Self::new(session);
        navigator.config = config;
        Ok(navigator)
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn set_settle_ms(&mut self, settle_ms: i64) -> Result<()> {
        let config = NavigatorConfig {
            settle_ms,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_poll_interval_ms(&mut self, poll_interval_ms: i64) -> Result<()> {
        let config = NavigatorConfig {
            poll_interval_ms,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_focus_timeout_ms(&mut self, focus_timeout_ms: i64) -> Result<()> {
        let config = NavigatorConfig {
            focus_timeout_ms,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_long_press_ms(&mut self, long_press_ms: i64) -> Result<()> {
        let config = NavigatorConfig {
            long_press_ms,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    pub fn now_ms(&self) -> i64 {
        self.session.now_ms()
    }

    /// Reads the current token of `accessor` once.
    pub fn focused<A>(&self, accessor: &A) -> Result<FocusToken>
    where
        A: FocusAccessor<S> + ?Sized,
    {
        accessor.read(&self.session)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_input(&mut self, enabled: bool) {
        self.trace_input = enabled;
    }

    pub fn set_trace_focus(&mut self, enabled: bool) {
        self.trace_focus = enabled;
    }

    pub fn set_trace_search(&mut self, enabled: bool) {
        self.trace_search = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_limit(max_entries)
    }

    pub(crate) fn trace_input_line(&mut self, line: String) {
        if self.trace_input {
            self.trace.line(line);
        }
    }

    pub(crate) fn trace_focus_line(&mut self, line: String) {
        if self.trace_focus {
            self.trace.line(line);
        }
    }

    pub(crate) fn trace_search_line(&mut self, line: String) {
        if self.trace_search {
            self.trace.line(line);
        }
    }
}
