use super::*;

impl<S: RemoteSession> Navigator<S> {
    /// Polls `accessor` until it reports something other than `previous`.
    ///
    /// Returns the new token as soon as it differs, or `previous` itself once
    /// `timeout_ms` has elapsed. An unchanged token is an ordinary outcome.
    pub fn await_change<A>(
        &mut self,
        accessor: &A,
        previous: &FocusToken,
        timeout_ms: i64,
    ) -> Result<FocusToken>
    where
        A: FocusAccessor<S> + ?Sized,
    {
        let started = self.session.now_ms();
        let mut polls = 0usize;
        let mut last = previous.clone();
        let changed = self.poll_until(timeout_ms, |session| {
            polls += 1;
            last = accessor.read(session)?;
            Ok(last != *previous)
        })?;
        let waited = self.session.now_ms().saturating_sub(started);

        if changed {
            self.trace_focus_line(format!(
                "[focus] changed accessor={} from={} to={} polls={} waited_ms={}",
                accessor.describe(),
                previous,
                last,
                polls,
                waited
            ));
            Ok(last)
        } else {
            self.trace_focus_line(format!(
                "[focus] timeout accessor={} token={} polls={} waited_ms={}",
                accessor.describe(),
                previous,
                polls,
                waited
            ));
            Ok(previous.clone())
        }
    }

    /// Same as [`Navigator::await_change`] with the configured focus timeout.
    pub fn await_focus_change<A>(&mut self, accessor: &A, previous: &FocusToken) -> Result<FocusToken>
    where
        A: FocusAccessor<S> + ?Sized,
    {
        let timeout_ms = self.config.focus_timeout_ms;
        self.await_change(accessor, previous, timeout_ms)
    }

    /// Polls until the focused token matches `expected` as a label.
    ///
    /// Returns the last observed token either way; callers compare it.
    pub fn await_token<A>(
        &mut self,
        accessor: &A,
        expected: &FocusToken,
        timeout_ms: i64,
    ) -> Result<FocusToken>
    where
        A: FocusAccessor<S> + ?Sized,
    {
        let mut last = FocusToken::none();
        let matched = self.poll_until(timeout_ms, |session| {
            last = accessor.read(session)?;
            Ok(last.matches_label(expected))
        })?;
        self.trace_focus_line(format!(
            "[focus] await_token accessor={} expected={} last={} matched={}",
            accessor.describe(),
            expected,
            last,
            matched
        ));
        Ok(last)
    }

    /// Polls an arbitrary read-only condition on the session.
    pub fn wait_until<F>(&mut self, timeout_ms: i64, condition: F) -> Result<bool>
    where
        F: FnMut(&S) -> Result<bool>,
    {
        self.poll_until(timeout_ms, condition)
    }

    fn poll_until<F>(&mut self, timeout_ms: i64, mut condition: F) -> Result<bool>
    where
        F: FnMut(&S) -> Result<bool>,
    {
        if timeout_ms < 0 {
            return Err(Error::InvalidConfig(
                "poll timeout requires non-negative milliseconds".into(),
            ));
        }
        let interval = self.config.poll_interval_ms.max(1);
        let deadline = self.session.now_ms().saturating_add(timeout_ms);
        // Guards against clocks whose sleep does not advance time.
        let max_polls = (timeout_ms / interval).saturating_add(2);
        let mut polls = 0i64;

        loop {
            if condition(&self.session)? {
                return Ok(true);
            }
            polls += 1;
            let now = self.session.now_ms();
            if now >= deadline || polls >= max_polls {
                return Ok(false);
            }
            self.session.sleep(interval.min(deadline - now))?;
        }
    }
}
