pub mod resend;

/// One outbound plain-text email. The sending client supplies the
/// sender address; delivery is binary per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}
