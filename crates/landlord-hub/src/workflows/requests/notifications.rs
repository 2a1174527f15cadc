use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{MemberId, RequestId, RequestStatus};
use crate::config::NotificationConfig;

/// Push payload delivered to a single member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub content: String,
    pub recipient_id: MemberId,
    pub link: String,
}

/// Outbound notification hook (web push, e-mail, chat adapters).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_notification(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification to {recipient} timed out after {after:?}")]
    TimedOut { recipient: MemberId, after: Duration },
    #[error("notification task aborted: {0}")]
    Aborted(String),
}

/// What happened to a request, phrased for its recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestNotice {
    Received,
    StatusUpdated(RequestStatus),
}

impl RequestNotice {
    fn render(self, request_id: &RequestId, recipient: &MemberId) -> Notification {
        let (title, content) = match self {
            RequestNotice::Received => (
                "New request received".to_string(),
                "A new request is waiting for your response".to_string(),
            ),
            RequestNotice::StatusUpdated(status) => (
                "Contract status updated".to_string(),
                format!("Request status is now {}", status.label()),
            ),
        };

        Notification {
            title,
            content,
            recipient_id: recipient.clone(),
            link: format!("/requests/{request_id}"),
        }
    }
}

/// Per-recipient delivery outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub delivered: Vec<MemberId>,
    pub failed: Vec<MemberId>,
}

/// Sends one notice to many recipients concurrently. Never fails: every error is logged and
/// recorded in the returned report.
pub struct NotificationDispatcher<N> {
    notifier: Arc<N>,
    timeout: Duration,
}

impl<N> NotificationDispatcher<N>
where
    N: Notifier + 'static,
{
    pub fn new(notifier: Arc<N>, config: &NotificationConfig) -> Self {
        Self {
            notifier,
            timeout: config.timeout,
        }
    }

    pub async fn fan_out(
        &self,
        notice: RequestNotice,
        request_id: &RequestId,
        recipients: &[MemberId],
    ) -> DispatchReport {
        debug!(
            request_id = %request_id,
            recipients = recipients.len(),
            "dispatching request notifications"
        );

        let handles = recipients.iter().map(|recipient| {
            let notification = notice.render(request_id, recipient);
            let notifier = Arc::clone(&self.notifier);
            let limit = self.timeout;
            let recipient = recipient.clone();
            tokio::spawn(async move {
                match tokio::time::timeout(limit, notifier.send_notification(notification)).await {
                    Ok(result) => result,
                    Err(_) => Err(NotificationError::TimedOut {
                        recipient,
                        after: limit,
                    }),
                }
            })
        });

        let outcomes = futures::future::join_all(handles).await;

        let mut report = DispatchReport::default();
        for (recipient, outcome) in recipients.iter().zip(outcomes) {
            let result = outcome
                .unwrap_or_else(|join_err| Err(NotificationError::Aborted(join_err.to_string())));
            match result {
                Ok(()) => report.delivered.push(recipient.clone()),
                Err(err) => {
                    warn!(
                        request_id = %request_id,
                        recipient = %recipient,
                        error = %err,
                        "notification dispatch failed"
                    );
                    report.failed.push(recipient.clone());
                }
            }
        }

        info!(
            request_id = %request_id,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "request notifications dispatched"
        );
        report
    }
}
