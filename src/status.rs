use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    expires_at: Option<Instant>,
}

/// Bottom status bar. Messages either stay until replaced or expire.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    current: Option<StatusMessage>,
}

impl StatusLine {
    pub fn show(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.set(kind, text.into(), None);
    }

    pub fn flash(&mut self, kind: StatusKind, text: impl Into<String>, ttl: Duration) {
        self.set(kind, text.into(), Some(Instant::now() + ttl));
    }

    fn set(&mut self, kind: StatusKind, text: String, expires_at: Option<Instant>) {
        match kind {
            StatusKind::Info => log::info!("status: {}", text),
            StatusKind::Error => log::warn!("status: {}", text),
        }
        self.current = Some(StatusMessage {
            text,
            kind,
            expires_at,
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drops the message once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .current
            .as_ref()
            .and_then(|m| m.expires_at)
            .map_or(false, |deadline| now >= deadline);
        if expired {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn text(&self) -> &str {
        self.current.as_ref().map(|m| m.text.as_str()).unwrap_or("")
    }
}
