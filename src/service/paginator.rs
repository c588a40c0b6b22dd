// service/paginator.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISPLAY_LIMIT: usize = 10;
pub const DISPLAY_STEP: usize = 10;

/// "See more" window over an already-filtered list. Nothing resets the
/// limit when filters change; that is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginator {
    pub display_limit: usize,
    pub step: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
            step: DISPLAY_STEP,
        }
    }
}

impl Paginator {
    pub fn with_limit(display_limit: usize) -> Self {
        Self {
            display_limit,
            ..Self::default()
        }
    }

    pub fn see_more(&mut self) {
        self.display_limit += self.step;
    }

    pub fn reset(&mut self) {
        self.display_limit = DEFAULT_DISPLAY_LIMIT;
    }

    pub fn visible<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        &records[..self.display_limit.min(records.len())]
    }

    pub fn has_more(&self, len: usize) -> bool {
        len > self.display_limit
    }

    pub fn next_limit(&self) -> usize {
        self.display_limit + self.step
    }
}
