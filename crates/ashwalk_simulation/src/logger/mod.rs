//! Глобальный logger с подключаемым sink.
//!
//! Симуляция не знает, куда уходят логи: headless-прогон печатает в stdout,
//! engine-адаптер подменяет sink на свой (Godot print, файл, ring buffer).
//! Sink ставится один раз при старте хоста через `set_log_sink()`.

use once_cell::sync::Lazy;
use std::sync::Mutex;

/// Куда писать строки лога. Реализация обязана быть thread-safe:
/// системы Bevy зовут logger из разных потоков.
pub trait LogSink: Send + Sync {
    fn print(&self, message: &str);
}

/// Sink по умолчанию — stdout (headless режим и тесты).
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn print(&self, message: &str) {
        println!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Всё ниже этого уровня отбрасывается до форматирования timestamp.
static LOG_THRESHOLD: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

static LOG_SINK: Lazy<Mutex<Option<Box<dyn LogSink>>>> = Lazy::new(|| Mutex::new(None));

/// Установить sink (зовёт хост при старте). Повторный вызов заменяет старый.
pub fn set_log_sink(sink: Box<dyn LogSink>) {
    let mut guard = LOG_SINK.lock().unwrap();
    *guard = Some(sink);
}

/// Поднять/опустить порог логирования.
pub fn set_log_threshold(level: LogLevel) {
    let mut guard = LOG_THRESHOLD.lock().unwrap();
    *guard = level;
}

/// Headless-инициализация: stdout sink, если хост ничего не поставил.
pub fn init_logger() {
    let mut guard = LOG_SINK.lock().unwrap();
    if guard.is_none() {
        *guard = Some(Box::new(StdoutSink));
    }
}

fn emit(level: LogLevel, message: &str) {
    {
        let threshold = LOG_THRESHOLD.lock().unwrap();
        if level < *threshold {
            return;
        }
    }
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] [{}] {}", timestamp, level.tag(), message);
    let guard = LOG_SINK.lock().unwrap();
    if let Some(sink) = guard.as_ref() {
        sink.print(&line);
    }
}

/// Debug-лог (FSM переходы, покадровая телеметрия).
pub fn log(message: &str) {
    emit(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    emit(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    emit(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    emit(LogLevel::Error, message);
}
