//! Single human-readable status line shared with the control surface

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLevel {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

/// Latest-value status channel; every update is also logged
#[derive(Debug)]
pub struct StatusIndicator {
    tx: watch::Sender<StatusMessage>,
}

impl StatusIndicator {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(StatusMessage {
            level: StatusLevel::Info,
            text: initial.into(),
        });
        Self { tx }
    }

    pub fn info(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::info!(status = %text, "Status");
        self.set(StatusLevel::Info, text);
    }

    pub fn warn(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(status = %text, "Status");
        self.set(StatusLevel::Warning, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::error!(status = %text, "Status");
        self.set(StatusLevel::Error, text);
    }

    fn set(&self, level: StatusLevel, text: String) {
        self.tx.send_replace(StatusMessage { level, text });
    }

    pub fn current(&self) -> StatusMessage {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusMessage> {
        self.tx.subscribe()
    }
}
