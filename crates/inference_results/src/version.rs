//! Wire protocol versions.
//!
//! Version ids follow `major * 1_000_000 + minor * 10_000 + patch * 100 + 99`
//! so that plain integer ordering matches release ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version of the peer a stream is written for or read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireVersion(pub u32);

impl WireVersion {
    pub const V_7_7_0: WireVersion = WireVersion::from_release(7, 7, 0);
    pub const V_7_8_0: WireVersion = WireVersion::from_release(7, 8, 0);
    pub const CURRENT: WireVersion = WireVersion::V_7_8_0;

    /// Build a version id from its release triple.
    pub const fn from_release(major: u32, minor: u32, patch: u32) -> Self {
        WireVersion(major * 1_000_000 + minor * 10_000 + patch * 100 + 99)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WireVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.0 / 1_000_000,
            (self.0 / 10_000) % 100,
            (self.0 / 100) % 100
        )
    }
}

/// First version whose peers understand typed class values and the
/// prediction field type.
pub const V_THRESHOLD: WireVersion = WireVersion::V_7_8_0;
