use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Transient status-bar message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: Level,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    fn new(level: Level, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
            at: Local::now(),
        }
    }

    pub fn stamp(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}
