// service/fetch_state.rs
use serde::Serialize;

/// Lifecycle of one upstream resource. Derived data is only computed from
/// `Loaded`; `Errored` carries a display string and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Loaded(T),
    Errored(String),
}

impl<T> FetchState<T> {
    pub fn name(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Loaded(_) => "loaded",
            FetchState::Errored(_) => "errored",
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            FetchState::Errored(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, String>> for FetchState<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(data) => FetchState::Loaded(data),
            Err(message) => FetchState::Errored(message),
        }
    }
}

/// Proof that a fetch was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// A [`FetchState`] guarded by a generation counter: a completion is only
/// applied if nothing newer was started (or cancelled) in between.
#[derive(Debug)]
pub struct FetchSlot<T> {
    generation: u64,
    state: FetchState<T>,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            state: FetchState::Idle,
        }
    }
}

impl<T> FetchSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. A slot that already holds data keeps showing it
    /// until the new result lands.
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        if !matches!(self.state, FetchState::Loaded(_)) {
            self.state = FetchState::Loading;
        }
        FetchTicket(self.generation)
    }

    /// Returns false when the ticket is stale and the result was dropped.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<T, String>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.state = result.into();
        true
    }

    /// Invalidate whatever is in flight.
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }
}
