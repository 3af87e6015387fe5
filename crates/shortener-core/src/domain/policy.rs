//! Overflow policy
//!
//! Decides, from the raw event's size, whether the heavy field must be
//! offloaded before the event can go on the bus.

use serde::{Deserialize, Serialize};

/// Bus maximum entry size in bytes
pub const MAX_PAYLOAD_BYTES: usize = 256_000;

/// Headroom for metadata the bus adds on its own
pub const SAFETY_MARGIN_BYTES: usize = 50;

/// Outcome of the overflow check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowDecision {
    PassThrough,
    Offload,
}

impl OverflowDecision {
    pub fn requires_offload(&self) -> bool {
        matches!(self, OverflowDecision::Offload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowPolicy {
    pub max_payload_bytes: usize,
    pub safety_margin: usize,
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        Self {
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            safety_margin: SAFETY_MARGIN_BYTES,
        }
    }
}

impl OverflowPolicy {
    pub fn new(max_payload_bytes: usize, safety_margin: usize) -> Self {
        Self {
            max_payload_bytes,
            safety_margin,
        }
    }

    /// Largest size that still passes through untouched
    pub fn threshold(&self) -> usize {
        self.max_payload_bytes.saturating_sub(self.safety_margin)
    }

    pub fn decide(&self, event_size: usize) -> OverflowDecision {
        if event_size > self.threshold() {
            OverflowDecision::Offload
        } else {
            OverflowDecision::PassThrough
        }
    }

    pub fn fits(&self, event_size: usize) -> bool {
        event_size <= self.threshold()
    }
}
