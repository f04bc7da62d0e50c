//! Immutable robot identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one paired robot: display name, serial and the shared
/// secret used to sign per-robot requests.
///
/// Created at discovery time and never mutated afterwards.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RobotIdentity {
    /// User-visible robot name.
    pub name: String,
    /// Vendor serial number, e.g. "OPS01234-56789".
    pub serial: String,
    /// Per-robot signing secret.
    #[serde(rename = "secret_key")]
    pub secret: String,
}

impl RobotIdentity {
    /// Creates a new robot identity.
    pub fn new(
        name: impl Into<String>,
        serial: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            serial: serial.into(),
            secret: secret.into(),
        }
    }
}

// The secret never appears in Debug output or logs.
impl fmt::Debug for RobotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotIdentity")
            .field("name", &self.name)
            .field("serial", &self.serial)
            .finish_non_exhaustive()
    }
}
