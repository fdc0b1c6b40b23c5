//! Prompt version labels.

use serde::{Deserialize, Serialize};

/// A prompt artifact version: the display label ("v3") plus the integer
/// that backs uniqueness per assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLabel {
    pub version: String,
    pub version_number: i32,
}

impl VersionLabel {
    /// Build the label for a version number.
    pub fn from_number(n: i32) -> Self {
        Self {
            version: format!("v{n}"),
            version_number: n,
        }
    }
}

/// Version number assigned when no durable counter is reachable.
pub const FALLBACK_VERSION_NUMBER: i32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_formats_number() {
        let v = VersionLabel::from_number(3);
        assert_eq!(v.version, "v3");
        assert_eq!(v.version_number, 3);
    }

    #[test]
    fn fallback_is_v1() {
        let v = VersionLabel::from_number(FALLBACK_VERSION_NUMBER);
        assert_eq!(v.version, "v1");
    }
}
