use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What a delivered token lets its recipient do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    ForgotPassword,
    SignUp,
    ChangeEmail,
}

/// TokenNotice
///
/// A single-use token addressed to an email owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNotice {
    pub purpose: TokenPurpose,
    pub email: String,
    pub token: String,
}

/// Notifier
///
/// Out-of-band delivery of email-bound tokens. The service never sends mail itself;
/// the deployment decides what delivery means.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notice: TokenNotice);
}

/// LogNotifier
///
/// Writes every notice to the log. The default delivery for local runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notice: TokenNotice) {
        tracing::info!(
            purpose = ?notice.purpose,
            email = %notice.email,
            token = %notice.token,
            "Token issued for delivery"
        );
    }
}

/// RecordingNotifier
///
/// Keeps every notice in memory so tests can pick tokens back up.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<TokenNotice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notices(&self) -> Vec<TokenNotice> {
        self.notices.lock().await.clone()
    }

    /// Most recent token sent to `email` for `purpose`.
    pub async fn last_token(&self, purpose: TokenPurpose, email: &str) -> Option<String> {
        self.notices
            .lock()
            .await
            .iter()
            .rev()
            .find(|n| n.purpose == purpose && n.email == email)
            .map(|n| n.token.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notice: TokenNotice) {
        self.notices.lock().await.push(notice);
    }
}

pub type NotifierState = Arc<dyn Notifier>;
