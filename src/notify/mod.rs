// Alert delivery
pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::Result;

/// Delivers text alerts to a single chat recipient.
pub trait Notifier {
    fn send(&self, text: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Send an alert, demoting any failure to a warning.
///
/// Notification failures are never escalated: a dropped Telegram message
/// must not abort a monitoring cycle.
pub async fn send_quiet<N: Notifier>(notifier: &N, text: &str) {
    if let Err(e) = notifier.send(text).await {
        tracing::warn!("Failed to send notification: {}", e);
    }
}
