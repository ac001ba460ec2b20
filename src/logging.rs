use serde::Deserialize;
use std::{cmp::Ordering, fmt, rc::Rc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
                LogLevel::Warn => 2,
                LogLevel::Error => 3,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

type Sink = Rc<dyn Fn(LogLevel, &str)>;

/// Structured JSON logger. Each event is one line: `ts`, `level`, `event`,
/// then the caller's fields flattened in.
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    sink: Sink,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(min_level: LogLevel) -> Self {
        Self::with_sink(min_level, console_sink)
    }

    pub fn with_sink(min_level: LogLevel, sink: impl Fn(LogLevel, &str) + 'static) -> Self {
        Self {
            min_level,
            sink: Rc::new(sink),
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn event(&self, level: LogLevel, event: &str, fields: serde_json::Value) {
        if level < self.min_level {
            return;
        }

        let mut payload = serde_json::Map::new();
        payload.insert(
            "ts".to_string(),
            serde_json::Value::Number(serde_json::Number::from(now_unix_millis())),
        );
        payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
        payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

        if let serde_json::Value::Object(extra) = fields {
            for (key, value) in extra {
                payload.insert(key, value);
            }
        }

        (self.sink)(level, &serde_json::Value::Object(payload).to_string());
    }

    pub fn debug(&self, event: &str, fields: serde_json::Value) {
        self.event(LogLevel::Debug, event, fields);
    }

    pub fn info(&self, event: &str, fields: serde_json::Value) {
        self.event(LogLevel::Info, event, fields);
    }

    pub fn warn(&self, event: &str, fields: serde_json::Value) {
        self.event(LogLevel::Warn, event, fields);
    }

    pub fn error(&self, event: &str, fields: serde_json::Value) {
        self.event(LogLevel::Error, event, fields);
    }
}

#[cfg(target_arch = "wasm32")]
fn console_sink(level: LogLevel, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Debug => web_sys::console::debug_1(&line),
        LogLevel::Info => web_sys::console::log_1(&line),
        LogLevel::Warn => web_sys::console::warn_1(&line),
        LogLevel::Error => web_sys::console::error_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn console_sink(level: LogLevel, line: &str) {
    if level >= LogLevel::Warn {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

#[cfg(target_arch = "wasm32")]
fn now_unix_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) fn capturing_logger(min_level: LogLevel) -> (Logger, Rc<std::cell::RefCell<Vec<String>>>) {
    let lines = Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink_lines = Rc::clone(&lines);
    let logger = Logger::with_sink(min_level, move |_, line| {
        sink_lines.borrow_mut().push(line.to_string());
    });
    (logger, lines)
}
