//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// HTTP listener bound and serving
    ServerStart,
    /// Configuration file read and validated
    ConfigLoaded,
    /// Documents loaded into the store
    StoreLoaded,
    /// Raw parameters normalized into a bounded query
    QueryNormalized,
    /// Count/find completed
    QueryExecuted,
    /// Count or find failed in the store
    StoreFailed,
    /// Request for a version other than the served one
    VersionRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ServerStart => "SERVER_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreLoaded => "STORE_LOADED",
            Event::QueryNormalized => "QUERY_NORMALIZED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::StoreFailed => "STORE_FAILED",
            Event::VersionRejected => "VERSION_REJECTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryNormalized | Event::QueryExecuted => Severity::Trace,
            Event::VersionRejected => Severity::Warn,
            Event::StoreFailed => Severity::Error,
            Event::ServerStart | Event::ConfigLoaded | Event::StoreLoaded => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::QueryNormalized.as_str(), "QUERY_NORMALIZED");
        assert_eq!(Event::StoreFailed.to_string(), "STORE_FAILED");
    }

    #[test]
    fn test_per_request_events_are_trace() {
        assert_eq!(Event::QueryNormalized.severity(), Severity::Trace);
        assert_eq!(Event::QueryExecuted.severity(), Severity::Trace);
        assert_eq!(Event::StoreFailed.severity(), Severity::Error);
    }
}
