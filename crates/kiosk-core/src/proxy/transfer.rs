//! Per-call transfer log.
//!
//! This is the only record of CMS connectivity the kiosk keeps, so every call
//! ends in exactly one log line: completed, failed, or abandoned because the
//! player went away first. The line is written when the log is dropped.

use std::time::Instant;

use axum::http::{Method, StatusCode};
use kiosk_types::RouteKind;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Pending,
    Completed,
    Failed(String),
}

#[derive(Debug)]
pub struct TransferLog {
    route: RouteKind,
    method: Method,
    url: String,
    started: Instant,
    status: Option<StatusCode>,
    bytes: usize,
    outcome: Outcome,
}

impl TransferLog {
    pub fn start(route: RouteKind, method: &Method, url: &str) -> Self {
        tracing::info!(route = %route, method = %method, url = %url, "→ upstream");
        Self {
            route,
            method: method.clone(),
            url: url.to_string(),
            started: Instant::now(),
            status: None,
            bytes: 0,
            outcome: Outcome::Pending,
        }
    }

    pub fn record_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn add_bytes(&mut self, count: usize) {
        self.bytes += count;
    }

    pub fn complete(&mut self) {
        if self.outcome == Outcome::Pending {
            self.outcome = Outcome::Completed;
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.outcome = Outcome::Failed(message.into());
    }

    #[cfg(test)]
    fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for TransferLog {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let status = self.status.map(|s| s.as_u16());
        match &self.outcome {
            Outcome::Completed => tracing::info!(
                route = %self.route,
                method = %self.method,
                url = %self.url,
                status,
                bytes = self.bytes,
                elapsed_ms,
                "← upstream {} ({} bytes)",
                status.unwrap_or_default(),
                self.bytes
            ),
            Outcome::Failed(message) => tracing::error!(
                route = %self.route,
                method = %self.method,
                url = %self.url,
                status,
                bytes = self.bytes,
                elapsed_ms,
                "upstream failed: {}",
                message
            ),
            Outcome::Pending => tracing::warn!(
                route = %self.route,
                method = %self.method,
                url = %self.url,
                status,
                bytes = self.bytes,
                elapsed_ms,
                "client disconnected, upstream call abandoned"
            ),
        }
    }
}
