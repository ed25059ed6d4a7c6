//! Header Event Logging
//!
//! Structured log of header construction and mutation, useful for:
//! - Tracking down callers that pass bad kinds or lengths
//! - Auditing which objects had their header rewritten
//!
//! Log Levels:
//! - ERROR: Rejected object references
//! - WARN: Rejected header construction
//! - INFO: Runtime initialisation
//! - TRACE: Per-object encode and stamp

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Log level for header events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

/// Header event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEvent {
    /// Runtime installed a factory
    Initialized { layout: String, verify_writes: bool },

    /// Header word constructed
    Encoded {
        kind: i32,
        elem_size_shift: i32,
        length: i32,
        packed: u32,
    },

    /// Construction or verified write refused
    Rejected {
        kind: i32,
        elem_size_shift: i32,
        length: i32,
        reason: String,
    },

    /// Header word written into an object
    Stamped { address: usize, packed: u32 },

    /// Object reference refused before the write
    BadReference { address: usize, reason: String },
}

impl HeaderEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            HeaderEvent::BadReference { .. } => LogLevel::Error,
            HeaderEvent::Rejected { .. } => LogLevel::Warn,
            HeaderEvent::Initialized { .. } => LogLevel::Info,
            HeaderEvent::Encoded { .. } | HeaderEvent::Stamped { .. } => LogLevel::Trace,
        }
    }
}

/// Header logger configuration
#[derive(Debug, Clone)]
pub struct HeaderLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,

    /// Events retained in memory; the oldest are dropped first
    pub max_events: usize,
}

/// Default number of retained events
pub const DEFAULT_MAX_EVENTS: usize = 4096;

impl Default for HeaderLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            console: false,
            json: false,
            timestamps: true,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

/// Header logger - collects header events and optionally echoes them
pub struct HeaderLogger {
    config: HeaderLoggerConfig,
    events: Mutex<VecDeque<(Instant, HeaderEvent)>>,
    enabled: AtomicBool,
}

impl HeaderLogger {
    pub fn new(config: HeaderLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(VecDeque::new()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Whether an event at `level` would be recorded
    #[inline]
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.is_enabled() && level <= self.config.level
    }

    /// Log a header event
    pub fn log(&self, event: HeaderEvent) {
        if !self.accepts(event.level()) {
            return;
        }

        if self.config.console {
            self.output_console(&event);
        }

        if self.config.max_events == 0 {
            return;
        }

        if let Ok(mut events) = self.events.lock() {
            while events.len() >= self.config.max_events {
                events.pop_front();
            }
            events.push_back((Instant::now(), event));
        }
    }

    fn output_console(&self, event: &HeaderEvent) {
        let line = if self.config.json {
            Self::format_json(event)
        } else {
            Self::format_human(event)
        };

        if self.config.timestamps {
            let now = chrono::Local::now();
            eprintln!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S%.3f"), line);
        } else {
            eprintln!("{}", line);
        }
    }

    /// Human-readable rendering of an event
    pub fn format_human(event: &HeaderEvent) -> String {
        match event {
            HeaderEvent::Initialized {
                layout,
                verify_writes,
            } => format!(
                "[HDR] Initialized ({} layout, verify_writes={})",
                layout, verify_writes
            ),
            HeaderEvent::Encoded {
                kind,
                elem_size_shift,
                length,
                packed,
            } => format!(
                "[HDR] Encoded kind={} shift={} length={} -> {:#010x}",
                kind, elem_size_shift, length, packed
            ),
            HeaderEvent::Rejected {
                kind,
                elem_size_shift,
                length,
                reason,
            } => format!(
                "[HDR] Rejected kind={} shift={} length={}: {}",
                kind, elem_size_shift, length, reason
            ),
            HeaderEvent::Stamped { address, packed } => {
                format!("[HDR] Stamped {:#010x} at {:#x}", packed, address)
            },
            HeaderEvent::BadReference { address, reason } => {
                format!("[HDR] Bad object reference {:#x}: {}", address, reason)
            },
        }
    }

    /// JSON rendering of an event
    pub fn format_json(event: &HeaderEvent) -> String {
        let json = match event {
            HeaderEvent::Initialized {
                layout,
                verify_writes,
            } => serde_json::json!({
                "type": "initialized",
                "layout": layout,
                "verify_writes": verify_writes
            }),
            HeaderEvent::Encoded {
                kind,
                elem_size_shift,
                length,
                packed,
            } => serde_json::json!({
                "type": "encoded",
                "kind": kind,
                "elem_size_shift": elem_size_shift,
                "length": length,
                "packed": packed
            }),
            HeaderEvent::Rejected {
                kind,
                elem_size_shift,
                length,
                reason,
            } => serde_json::json!({
                "type": "rejected",
                "kind": kind,
                "elem_size_shift": elem_size_shift,
                "length": length,
                "reason": reason
            }),
            HeaderEvent::Stamped { address, packed } => serde_json::json!({
                "type": "stamped",
                "address": address,
                "packed": packed
            }),
            HeaderEvent::BadReference { address, reason } => serde_json::json!({
                "type": "bad_reference",
                "address": address,
                "reason": reason
            }),
        };
        json.to_string()
    }

    pub fn get_events(&self) -> Vec<(Instant, HeaderEvent)> {
        match self.events.lock() {
            Ok(events) => events.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear_events(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn event_count(&self) -> usize {
        match self.events.lock() {
            Ok(events) => events.len(),
            Err(_) => 0,
        }
    }
}

impl Default for HeaderLogger {
    fn default() -> Self {
        Self::new(HeaderLoggerConfig::default())
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<HeaderLogger> = Mutex::new(HeaderLogger::default());
}

/// Log a header event to the global logger
pub fn log_event(event: HeaderEvent) {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.log(event);
    }
}

/// Replace the global logger
pub fn configure_logger(config: HeaderLoggerConfig) {
    if let Ok(mut logger) = GLOBAL_LOGGER.lock() {
        *logger = HeaderLogger::new(config);
    }
}

/// Global logger event count
pub fn get_event_count() -> usize {
    match GLOBAL_LOGGER.lock() {
        Ok(logger) => logger.event_count(),
        Err(_) => 0,
    }
}

/// Snapshot of the global logger's events
pub fn get_events() -> Vec<HeaderEvent> {
    match GLOBAL_LOGGER.lock() {
        Ok(logger) => logger.get_events().into_iter().map(|(_, e)| e).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> HeaderEvent {
        HeaderEvent::Rejected {
            kind: 9,
            elem_size_shift: 0,
            length: 1,
            reason: "Invalid object kind tag: 9".to_string(),
        }
    }

    #[test]
    fn test_logger_basic() {
        let logger = HeaderLogger::default();
        logger.log(rejected());
        assert_eq!(logger.event_count(), 1);
        assert_eq!(logger.get_events()[0].1, rejected());
    }

    #[test]
    fn test_logger_level_filter() {
        let logger = HeaderLogger::default();
        logger.log(HeaderEvent::Stamped {
            address: 0x1000,
            packed: 7,
        });
        assert_eq!(logger.event_count(), 0);

        let logger = HeaderLogger::new(HeaderLoggerConfig {
            level: LogLevel::Trace,
            ..Default::default()
        });
        logger.log(HeaderEvent::Stamped {
            address: 0x1000,
            packed: 7,
        });
        assert_eq!(logger.event_count(), 1);
    }

    #[test]
    fn test_logger_disable() {
        let logger = HeaderLogger::default();
        logger.disable();
        logger.log(rejected());
        assert_eq!(logger.event_count(), 0);

        logger.enable();
        logger.log(rejected());
        logger.clear_events();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_logger_drops_oldest_at_capacity() {
        let logger = HeaderLogger::new(HeaderLoggerConfig {
            level: LogLevel::Trace,
            max_events: 3,
            ..Default::default()
        });
        for packed in 0..10u32 {
            logger.log(HeaderEvent::Stamped {
                address: 0x1000,
                packed,
            });
        }

        assert_eq!(logger.event_count(), 3);
        let kept: Vec<u32> = logger
            .get_events()
            .into_iter()
            .map(|(_, event)| match event {
                HeaderEvent::Stamped { packed, .. } => packed,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(kept, vec![7, 8, 9]);
    }

    #[test]
    fn test_logger_zero_capacity_keeps_nothing() {
        let logger = HeaderLogger::new(HeaderLoggerConfig {
            max_events: 0,
            ..Default::default()
        });
        logger.log(rejected());
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_format_human() {
        let line = HeaderLogger::format_human(&HeaderEvent::Encoded {
            kind: 2,
            elem_size_shift: 3,
            length: 5,
            packed: 0x2B02,
        });
        assert_eq!(line, "[HDR] Encoded kind=2 shift=3 length=5 -> 0x00002b02");
    }

    #[test]
    fn test_format_json() {
        let line = HeaderLogger::format_json(&HeaderEvent::Stamped {
            address: 16,
            packed: 42,
        });
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "stamped");
        assert_eq!(value["address"], 16);
        assert_eq!(value["packed"], 42);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::from_name("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("verbose"), None);
        assert!(LogLevel::Error < LogLevel::Trace);
    }

    #[test]
    fn test_global_logger() {
        let before = get_event_count();
        log_event(HeaderEvent::BadReference {
            address: 0,
            reason: "null object".to_string(),
        });
        assert!(get_event_count() > before);
    }
}
