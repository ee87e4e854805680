//! Fetch status definitions
//!
//! `FetchStatus` is overwritten after every profile request so an observer can
//! follow the batch. Its phase only moves forward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a profile fetch batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    Idle,
    Progress,
    Complete,
    Error,
}

impl FetchPhase {
    /// Returns true if the batch has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// Checks whether moving from this phase to `next` is allowed
    ///
    /// Phases only advance: idle -> progress -> complete | error. Progress may
    /// repeat, and a batch may fail before its first request.
    pub fn can_transition_to(&self, next: FetchPhase) -> bool {
        use FetchPhase::*;

        matches!(
            (self, next),
            (Idle, Progress) | (Idle, Error) | (Progress, Progress | Complete | Error)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Progress => "progress",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a profile fetch batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStatus {
    pub phase: FetchPhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

impl FetchStatus {
    /// Status after `current` of `total` profiles were fetched
    pub fn progress(current: usize, total: usize) -> Self {
        let current = current.min(total);
        let message = if current == 0 {
            "Fetching profiles...".to_string()
        } else {
            format!("Fetching profiles... ({}/{})", current, total)
        };

        Self {
            phase: FetchPhase::Progress,
            current,
            total,
            message,
        }
    }

    /// Status of a batch that fetched every profile
    pub fn complete(total: usize) -> Self {
        Self {
            phase: FetchPhase::Complete,
            current: total,
            total,
            message: format!("Successfully fetched {} profiles!", total),
        }
    }

    /// Status of a batch that was aborted after `current` profiles
    pub fn error(current: usize, total: usize, reason: impl fmt::Display) -> Self {
        Self {
            phase: FetchPhase::Error,
            current: current.min(total),
            total,
            message: format!("Error: {}", reason),
        }
    }

    /// Returns true if the batch has ended
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}/{} {}",
            self.phase, self.current, self.total, self.message
        )
    }
}
