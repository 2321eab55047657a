use super::*;

/// Primitive keyboard access to a live UI session.
///
/// Failures are fatal for the session and are propagated as-is.
pub trait KeyDispatch {
    fn press_key(&mut self, key: &str) -> Result<()>;

    fn key_down(&mut self, key: &str) -> Result<()>;

    fn key_up(&mut self, key: &str) -> Result<()>;
}

/// Everything the engine needs from a session: keys plus a clock.
pub trait RemoteSession: KeyDispatch + Clock {}

impl<T: KeyDispatch + Clock + ?Sized> RemoteSession for T {}

impl<S: RemoteSession> Navigator<S> {
    /// Dispatches one command, then waits out the settling delay.
    pub fn send(&mut self, command: Command) -> Result<()> {
        if let Command::HoldSelect(duration_ms) = command {
            return self.hold(Command::Select, duration_ms);
        }

        let key = command.key();
        self.session.press_key(key)?;
        self.trace_input_line(format!(
            "[input] press command={command} key={key} settle_ms={} now_ms={}",
            self.config.settle_ms,
            self.session.now_ms()
        ));
        self.settle()
    }

    pub fn send_repeated(&mut self, command: Command, count: usize) -> Result<()> {
        for _ in 0..count {
            self.send(command)?;
        }
        Ok(())
    }

    /// Key-down, hold for `duration_ms`, key-up, then settle.
    ///
    /// The hold is not interruptible. Whatever the UI does in response has to
    /// be awaited separately.
    pub fn hold(&mut self, command: Command, duration_ms: i64) -> Result<()> {
        if duration_ms < 0 {
            return Err(Error::InvalidConfig(
                "hold requires non-negative milliseconds".into(),
            ));
        }
        let key = command.key();
        self.session.key_down(key)?;
        self.trace_input_line(format!(
            "[input] key_down key={key} hold_ms={duration_ms} now_ms={}",
            self.session.now_ms()
        ));
        self.session.sleep(duration_ms)?;
        self.session.key_up(key)?;
        self.trace_input_line(format!(
            "[input] key_up key={key} now_ms={}",
            self.session.now_ms()
        ));
        self.settle()
    }

    pub fn long_press(&mut self, command: Command) -> Result<()> {
        let duration_ms = self.config.long_press_ms;
        self.hold(command, duration_ms)
    }

    /// Runs a button script in the syntax accepted by [`parse_sequence`].
    pub fn press_sequence(&mut self, script: &str) -> Result<()> {
        let steps = parse_sequence(script)?;
        for (command, count) in steps {
            self.send_repeated(command, count)?;
        }
        Ok(())
    }

    fn settle(&mut self) -> Result<()> {
        if self.config.settle_ms > 0 {
            self.session.sleep(self.config.settle_ms)?;
        }
        Ok(())
    }
}
