use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

/// Lets at most one operation of a kind run at a time.
///
/// The generation counter moves forward on every [`SingleFlight::try_begin`]
/// and on [`SingleFlight::supersede`]; a result whose token no longer matches
/// [`SingleFlight::is_current`] is stale and should be dropped.
#[derive(Clone, Default)]
pub struct SingleFlight {
    inner: Arc<FlightState>,
}

#[derive(Default)]
struct FlightState {
    busy: AtomicBool,
    generation: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightToken(u64);

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let token = FlightToken(self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1);
        Some(FlightGuard {
            state: Arc::clone(&self.inner),
            token,
        })
    }

    /// Invalidates whatever is currently in flight without waiting for it,
    /// e.g. a pump scan still running when the form it would fill is submitted.
    pub fn supersede(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_current(&self, token: FlightToken) -> bool {
        self.inner.generation.load(Ordering::Acquire) == token.0
    }
}

/// Clears the busy flag when dropped.
pub struct FlightGuard {
    state: Arc<FlightState>,
    token: FlightToken,
}

impl FlightGuard {
    pub fn token(&self) -> FlightToken {
        self.token
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::Release);
    }
}
