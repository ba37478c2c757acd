//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger and the source tags.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, sources};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: sources::SCENE.to_string(),
        message: format!("{:?} message", severity),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug_names() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_without_location() {
    let e = entry(LogSeverity::Info, None, None);
    assert_eq!(e.source, sources::SCENE);
    assert_eq!(e.message, "Info message");
    assert!(e.file.is_none());
    assert!(e.line.is_none());
}

#[test]
fn test_log_entry_with_location() {
    let e = entry(LogSeverity::Error, Some("chc.rs"), Some(42));
    let copy = e.clone();
    assert_eq!(copy.file, Some("chc.rs"));
    assert_eq!(copy.line, Some(42));
    assert_eq!(copy.severity, LogSeverity::Error);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        // Both output branches, must not panic
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("scene.rs"), Some(7)));
    }
}

#[test]
fn test_format_entry_appends_location_only_when_known() {
    let plain = DefaultLogger::format_entry(&entry(LogSeverity::Warn, None, None));
    assert!(plain.contains(sources::SCENE));
    assert!(plain.ends_with("Warn message"));

    let located = DefaultLogger::format_entry(&entry(LogSeverity::Error, Some("scene.rs"), Some(7)));
    assert!(located.ends_with("Error message (scene.rs:7)"));

    // A file without a line is not worth printing
    let partial = DefaultLogger::format_entry(&entry(LogSeverity::Error, Some("scene.rs"), None));
    assert!(!partial.contains("scene.rs"));
}

#[test]
fn test_source_tags_are_distinct() {
    let tags = [
        sources::SCENE, sources::CAMERA, sources::QUERY_POOL,
        sources::PIPELINED, sources::CHC, sources::MOCK,
    ];
    for (index, tag) in tags.iter().enumerate() {
        assert!(tag.starts_with("grid_culling::"));
        assert!(!tags[index + 1..].contains(tag));
    }
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
}
