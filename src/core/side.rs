use serde::{Deserialize, Serialize};
use std::fmt;

/// Which book a trade table represents.
///
/// Only used to label diagnostics and result columns; it has no effect on
/// any computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Internal,
    Clearer,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Internal => "internal",
            Side::Clearer => "clearer",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
