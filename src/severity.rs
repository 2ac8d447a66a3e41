//! Log severity and the HTTP status → severity mapping.

use std::fmt;

/// The level an access-log line is written at.
///
/// Three buckets, no overlap:
///
/// | Status        | Severity            |
/// |---------------|---------------------|
/// | `500..`       | [`Severity::Error`]   |
/// | `400..500`    | [`Severity::Warning`] |
/// | anything else | [`Severity::Info`]    |
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn from_status(status: u16) -> Self {
        match status {
            500.. => Self::Error,
            400..500 => Self::Warning,
            _ => Self::Info,
        }
    }

    /// The Cloud Logging `LogSeverity` name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info    => "INFO",
            Self::Warning => "WARNING",
            Self::Error   => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(Severity::from_status(100), Severity::Info);
        assert_eq!(Severity::from_status(200), Severity::Info);
        assert_eq!(Severity::from_status(304), Severity::Info);
        assert_eq!(Severity::from_status(399), Severity::Info);
        assert_eq!(Severity::from_status(400), Severity::Warning);
        assert_eq!(Severity::from_status(499), Severity::Warning);
        assert_eq!(Severity::from_status(500), Severity::Error);
        assert_eq!(Severity::from_status(599), Severity::Error);
    }

    #[test]
    fn names_match_cloud_logging() {
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Error.as_str(), "ERROR");
    }
}
