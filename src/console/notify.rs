use std::sync::Mutex;

use tracing::error;

/// `tracing` target of the developer-facing diagnostic channel.
pub const DIAGNOSTIC_TARGET: &str = "book_console::diagnostic";

/// Where user-facing notifications go.
pub trait Notifier {
    fn error(&self, message: &str);
}

/// Sends notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        error!(target: "book_console::notification", "{}", message);
    }
}

/// Buffers notifications until the UI drains them for display.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    messages: Mutex<Vec<String>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every pending message, oldest first.
    pub fn drain(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for NotificationQueue {
    fn error(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn error(&self, message: &str) {
        (**self).error(message)
    }
}
