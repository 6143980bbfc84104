/// Side-effect dispatcher boundary.
///
/// Registration emits one welcome-notification job onto a Redis stream; an
/// external worker owns delivery. The job id is derived deterministically
/// from the subject id, so at-least-once delivery stays idempotent on the
/// consumer side. The registration response never blocks on delivery.
use redis::aio::ConnectionManager;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, Result};

#[derive(Clone)]
pub struct NotificationDispatcher {
    redis: ConnectionManager,
    stream: String,
}

impl NotificationDispatcher {
    pub fn new(redis: ConnectionManager, stream: impl Into<String>) -> Self {
        Self {
            redis,
            stream: stream.into(),
        }
    }

    /// Enqueue a welcome notification for a freshly registered user.
    pub async fn enqueue_welcome(&self, subject_id: Uuid, email: &str) -> Result<()> {
        let job_id = Uuid::new_v5(&Uuid::NAMESPACE_OID, subject_id.as_bytes());

        let mut conn = self.redis.clone();
        redis::cmd("XADD")
            .arg(&self.stream)
            .arg("*")
            .arg("job_id")
            .arg(job_id.to_string())
            .arg("kind")
            .arg("welcome_email")
            .arg("subject_id")
            .arg(subject_id.to_string())
            .arg("email")
            .arg(email)
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to enqueue notification: {e}")))?;

        info!(%subject_id, %job_id, "welcome notification enqueued");
        Ok(())
    }

    /// Fire-and-forget enqueue with one retry. Registration has already
    /// committed by the time this runs; a dropped job is logged, not
    /// propagated.
    pub fn enqueue_welcome_detached(&self, subject_id: Uuid, email: String) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if dispatcher
                .enqueue_welcome(subject_id, &email)
                .await
                .is_err()
            {
                if let Err(e) = dispatcher.enqueue_welcome(subject_id, &email).await {
                    warn!(%subject_id, error = %e, "dropping welcome notification after retry");
                }
            }
        });
    }
}
