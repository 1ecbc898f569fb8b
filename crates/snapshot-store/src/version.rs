use serde::{Deserialize, Serialize};

/// Version number of a versioned aggregate, used for optimistic concurrency control.
///
/// Versions start at 0 and advance by exactly 1 for every committed mutation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) of a freshly seeded aggregate.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.0
    }
}
