//! Observability for the query service
//!
//! Structured JSON logging of typed events. Logging is synchronous,
//! read-only with respect to the query being processed, and never fails
//! the caller.
//!
//! # Usage
//!
//! ```ignore
//! use charitybase::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::QueryExecuted, &[("records", "10")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_line_carries_event_severity() {
        let event = Event::VersionRejected;
        let line = logger::capture_log(
            event.severity(),
            event.as_str(),
            &[("requested", "v0.1.0")],
        );

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "VERSION_REJECTED");
        assert_eq!(parsed["severity"], "WARN");
        assert_eq!(parsed["requested"], "v0.1.0");
    }

    #[test]
    fn test_per_request_events_silent_by_default() {
        assert!(!Logger::enabled(Event::QueryExecuted.severity()));
        assert!(Logger::enabled(Event::StoreFailed.severity()));
    }
}
