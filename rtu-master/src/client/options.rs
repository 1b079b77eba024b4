use std::time::Duration;

use crate::client::draft::Draft;
use crate::decode::DecodeLevel;

/// Settings of a master task
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MasterOptions {
    /// How long to wait for the reply to a request
    pub threshold: Duration,
    /// Pause before each request is written
    pub throttle: Duration,
    /// Silence after which a partially received frame is discarded
    pub flush_rate: Duration,
    /// Number of requests that may wait behind the one in flight
    pub max_queued_requests: usize,
    /// Protocol decoding in the log
    pub decode: DecodeLevel,
    /// Named request presets
    pub draft: Option<Draft>,
}

impl MasterOptions {
    /// Set the response timeout
    pub fn threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the delay before each request
    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Set the idle period after which partial frames are dropped
    pub fn flush_rate(mut self, flush_rate: Duration) -> Self {
        self.flush_rate = flush_rate;
        self
    }

    /// Set the decode level
    pub fn decode(mut self, decode: DecodeLevel) -> Self {
        self.decode = decode;
        self
    }

    /// Set the draft table
    pub fn draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }
}

impl Default for MasterOptions {
    fn default() -> Self {
        Self {
            threshold: Duration::from_millis(1000),
            throttle: Duration::ZERO,
            flush_rate: Duration::from_millis(250),
            max_queued_requests: 16,
            decode: DecodeLevel::default(),
            draft: None,
        }
    }
}
