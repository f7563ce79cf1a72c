use std::io::Write;
use std::sync::OnceLock;

use chrono::Local;

static LOGGER: OnceLock<Logger> = OnceLock::new();

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub struct Logger {
    prefix: Option<String>,
}

impl Logger {
    fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    fn format_line(&self, timestamp: &str, file: &str, line: u32, message: &str) -> String {
        let file_name = file.rsplit(['/', '\\']).next().unwrap_or(file);
        match self.prefix {
            Some(ref prefix) => format!("[{}][{}][{}:{}] {}", timestamp, prefix, file_name, line, message),
            None => format!("[{}][{}:{}] {}", timestamp, file_name, line, message),
        }
    }

    pub fn log(&self, file: &str, line: u32, message: &str) {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let formatted = self.format_line(&timestamp, file, line, message);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", formatted);
    }
}

/// Installs the process-wide logger. Later calls keep the first prefix.
pub fn init_logger(prefix: Option<String>) {
    LOGGER.get_or_init(|| Logger::new(prefix));
}

pub fn log(file: &str, line: u32, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.log(file, line, message);
    } else {
        eprintln!("Logger not initialized! Call init_logger() first.");
    }
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::logger::log(file!(), line!(), &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_keeps_only_file_name() {
        let logger = Logger::new(None);
        let line = logger.format_line("T", "common/src/games/ultimate/session.rs", 12, "hello");
        assert_eq!(line, "[T][session.rs:12] hello");
    }

    #[test]
    fn test_line_includes_prefix() {
        let logger = Logger::new(Some("Host".to_string()));
        let line = logger.format_line("T", "a\\b.rs", 3, "x");
        assert_eq!(line, "[T][Host][b.rs:3] x");
    }
}
