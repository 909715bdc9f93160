use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn render_context(context: Option<&Value>) -> String {
    match context {
        Some(Value::Null) | None => String::new(),
        Some(value) => format!(" {value}"),
    }
}

/// Emits `message` at `level`, with the structured context appended as JSON.
pub fn log_event(level: LogLevel, message: &str, context: Option<Value>) {
    let context = render_context(context.as_ref());
    match level {
        LogLevel::Debug => tracing::debug!("[Statute] {}{}", message, context),
        LogLevel::Info => tracing::info!("[Statute] {}{}", message, context),
        LogLevel::Warn => tracing::warn!("[Statute] {}{}", message, context),
        LogLevel::Error => tracing::error!("[Statute] {}{}", message, context),
    }
}

/// Installs the fmt subscriber used by every binary.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}
