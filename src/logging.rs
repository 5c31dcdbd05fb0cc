use chrono::{SecondsFormat, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "error" => Level::Error,
            "warn" | "warning" => Level::Warn,
            "debug" => Level::Debug,
            _ => Level::Info,
        }
    }
}

/// Structured line logger: one JSON object per event, context keys merged
/// at the top level. Warnings and errors go to stderr.
#[derive(Clone)]
pub struct Logger {
    base: Map<String, Value>,
    min_level: Level,
}

static LOGGER: OnceCell<Logger> = OnceCell::new();

pub fn init_logger(service: &'static str) -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(service))
}

/// Falls back to the crate name when no explicit init happened, so library
/// call sites never have to care about initialization order.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(env!("CARGO_PKG_NAME")))
}

impl Logger {
    fn new(service: &str) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|value| value.into_string().ok())
            .or_else(|| env::var("HOSTNAME").ok())
            .unwrap_or_else(|| "unknown".to_string());

        let mut base = Map::new();
        base.insert("service".into(), Value::String(service.to_string()));
        base.insert("host".into(), Value::String(host));

        Self {
            base,
            min_level: env::var("LOG_LEVEL")
                .map(|value| Level::parse(&value))
                .unwrap_or(Level::Info),
        }
    }

    pub fn debug<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Debug, event, context);
    }

    pub fn info<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Info, event, context);
    }

    pub fn warn<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Warn, event, context);
    }

    pub fn error<T: Serialize>(&self, event: &str, context: T) {
        self.emit(Level::Error, event, context);
    }

    fn emit<T: Serialize>(&self, level: Level, event: &str, context: T) {
        if level > self.min_level {
            return;
        }
        let context = serde_json::to_value(context).unwrap_or(Value::Null);
        let line = build_line(&self.base, level, event, context).to_string();
        if level <= Level::Warn {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

fn build_line(base: &Map<String, Value>, level: Level, event: &str, context: Value) -> Value {
    let mut payload = base.clone();
    payload.insert(
        "timestamp".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    payload.insert("level".into(), Value::String(level.label().to_string()));
    payload.insert("event".into(), Value::String(event.to_string()));
    match context {
        // Object contexts flatten into the line itself.
        Value::Object(map) => payload.extend(map),
        Value::Null => {}
        other => {
            payload.insert("context".into(), other);
        }
    }
    Value::Object(payload)
}
