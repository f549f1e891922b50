//! Quantization buckets.
//!
//! Exact counts are never shown on a user-visible surface — they're
//! quantized into a small enumerated bucket first, so a bucket can't leak a
//! raw number because it never carried one.

use serde::{Deserialize, Serialize};

/// A count quantized away from its exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeBucket {
    /// 0
    Nothing,
    /// 1–3
    AFew,
    /// 4+
    Several,
}

impl MagnitudeBucket {
    /// Quantize a raw count into its bucket.
    pub fn of(count: usize) -> Self {
        match count {
            0 => Self::Nothing,
            1..=3 => Self::AFew,
            _ => Self::Several,
        }
    }
}

/// Urgency quantized away from an exact timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonBucket {
    Now,
    Soon,
    Later,
}

/// Notification-observer app classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppClassBucket {
    Transport,
    Health,
    Institution,
    Commerce,
    Unknown,
}
