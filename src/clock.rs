use super::*;
use std::time::{Duration, Instant};

/// Time source and cooperative suspension for one session.
pub trait Clock {
    fn now_ms(&self) -> i64;

    fn sleep(&mut self, delta_ms: i64) -> Result<()>;
}

/// Wall-clock time. `sleep` parks the calling thread, which is the only flow
/// driving its session.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    fn sleep(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::InvalidConfig(
                "sleep requires non-negative milliseconds".into(),
            ));
        }
        std::thread::sleep(Duration::from_millis(delta_ms.unsigned_abs()));
        Ok(())
    }
}

/// Pairs an external key dispatcher with a clock so it can be driven by a
/// [`Navigator`](crate::Navigator).
#[derive(Debug)]
pub struct LiveSession<D, C = SystemClock> {
    dispatch: D,
    clock: C,
}

impl<D: KeyDispatch> LiveSession<D, SystemClock> {
    pub fn new(dispatch: D) -> Self {
        Self {
            dispatch,
            clock: SystemClock::new(),
        }
    }
}

impl<D: KeyDispatch, C: Clock> LiveSession<D, C> {
    pub fn with_clock(dispatch: D, clock: C) -> Self {
        Self { dispatch, clock }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatch
    }

    pub fn into_parts(self) -> (D, C) {
        (self.dispatch, self.clock)
    }
}

impl<D: KeyDispatch, C> KeyDispatch for LiveSession<D, C> {
    fn press_key(&mut self, key: &str) -> Result<()> {
        self.dispatch.press_key(key)
    }

    fn key_down(&mut self, key: &str) -> Result<()> {
        self.dispatch.key_down(key)
    }

    fn key_up(&mut self, key: &str) -> Result<()> {
        self.dispatch.key_up(key)
    }
}

impl<D, C: Clock> Clock for LiveSession<D, C> {
    fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn sleep(&mut self, delta_ms: i64) -> Result<()> {
        self.clock.sleep(delta_ms)
    }
}

impl<D: PageQuery, C> PageQuery for LiveSession<D, C> {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        self.dispatch.query_all(selector)
    }
}
