//! Admission of check-in submissions
//!
//! Each submission runs validate → resolve → dedupe → commit exactly once
//! and ends in a single outcome. The dedupe check and the commit happen
//! atomically inside the log store, so two concurrent submissions for the
//! same (badge, activity) pair cannot both be admitted. Publication to
//! viewers happens inside that same commit via the store's listeners.

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::{CheckInEvent, CheckInKey, Clock, ValidationError};
use rollcall_directory::{DirectoryError, DirectoryResolver};
use rollcall_storage::{Admission, LogStore, StorageError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Default time allowed for one directory lookup
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(3);

/// Body of a check-in or deletion request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInRequest {
    /// Scanned badge identifier; `qrCode` is what badge scanners send
    #[serde(default, alias = "qrCode")]
    pub badge_id: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
}

impl CheckInRequest {
    pub fn new(badge_id: impl Into<String>, activity: impl Into<String>) -> Self {
        Self {
            badge_id: Some(badge_id.into()),
            activity: Some(activity.into()),
        }
    }

    pub fn key(&self) -> Result<CheckInKey, ValidationError> {
        CheckInKey::parse(self.badge_id.as_deref(), self.activity.as_deref())
    }
}

/// Why a submission was not admitted
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Missing or malformed input
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The directory does not know the badge
    #[error("Could not resolve name for badge {badge_id}")]
    UnresolvedIdentity { badge_id: String },

    /// The directory failed or did not answer in time
    #[error("Could not resolve name for badge {badge_id}: {reason}")]
    ResolverUnavailable { badge_id: String, reason: String },

    /// The pair was already checked in
    #[error("{display_name} already checked in to {activity} at {timestamp}")]
    DuplicateCheckIn {
        badge_id: String,
        display_name: String,
        activity: String,
        timestamp: String,
    },

    /// The durable write failed; nothing was admitted
    #[error("Failed to record check-in: {0}")]
    PersistenceFailure(#[from] StorageError),
}

impl AdmissionError {
    /// Whether the submitter can fix this by changing or resending the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::PersistenceFailure(_))
    }
}

/// Runs the admission sequence for check-in submissions
pub struct AdmissionController {
    store: Arc<LogStore>,
    directory: Arc<dyn DirectoryResolver>,
    clock: Arc<dyn Clock>,
    resolver_timeout: Duration,
}

impl AdmissionController {
    pub fn new(
        store: Arc<LogStore>,
        directory: Arc<dyn DirectoryResolver>,
        clock: Arc<dyn Clock>,
        resolver_timeout: Duration,
    ) -> Self {
        Self {
            store,
            directory,
            clock,
            resolver_timeout,
        }
    }

    /// Admit one submission, returning the new event
    pub async fn submit(&self, request: &CheckInRequest) -> Result<CheckInEvent, AdmissionError> {
        let key = request.key()?;
        let display_name = self.resolve(key.badge_id()).await?;

        let event = CheckInEvent::new(&key, display_name, self.clock.stamp());
        match self.store.admit(event).await? {
            Admission::Admitted(event) => {
                info!(
                    badge_id = %event.badge_id,
                    activity = %event.activity,
                    name = %event.display_name,
                    "Check-in admitted"
                );
                Ok(event)
            }
            Admission::Duplicate(existing) => Err(AdmissionError::DuplicateCheckIn {
                badge_id: existing.badge_id,
                display_name: existing.display_name,
                activity: existing.activity,
                timestamp: existing.timestamp,
            }),
        }
    }

    async fn resolve(&self, badge_id: &str) -> Result<String, AdmissionError> {
        let lookup = tokio::time::timeout(self.resolver_timeout, self.directory.resolve(badge_id));

        match lookup.await {
            Ok(Ok(Some(name))) => Ok(name),
            Ok(Ok(None)) => {
                warn!(badge_id = %badge_id, directory = self.directory.name(), "Badge not found in directory");
                Err(AdmissionError::UnresolvedIdentity {
                    badge_id: badge_id.to_string(),
                })
            }
            Ok(Err(e)) => Err(unavailable(badge_id, &e)),
            Err(_) => {
                warn!(
                    badge_id = %badge_id,
                    timeout_ms = self.resolver_timeout.as_millis() as u64,
                    "Directory lookup timed out"
                );
                Err(AdmissionError::ResolverUnavailable {
                    badge_id: badge_id.to_string(),
                    reason: "directory lookup timed out".to_string(),
                })
            }
        }
    }
}

fn unavailable(badge_id: &str, error: &DirectoryError) -> AdmissionError {
    warn!(badge_id = %badge_id, error = %error, "Directory lookup failed");
    AdmissionError::ResolverUnavailable {
        badge_id: badge_id.to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::FixedClock;
    use rollcall_directory::StaticDirectory;
    use rollcall_storage::InMemoryBackend;

    /// Directory that never answers in time
    struct SlowDirectory;

    #[async_trait::async_trait]
    impl DirectoryResolver for SlowDirectory {
        async fn resolve(&self, _badge_id: &str) -> Result<Option<String>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some("Too Late".into()))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    async fn controller_with(
        directory: Arc<dyn DirectoryResolver>,
        backend: Arc<InMemoryBackend>,
    ) -> (AdmissionController, Arc<LogStore>) {
        let store = Arc::new(LogStore::open(backend).await.unwrap());
        let controller = AdmissionController::new(
            store.clone(),
            directory,
            Arc::new(FixedClock::at(9, 30).unwrap()),
            Duration::from_millis(100),
        );
        (controller, store)
    }

    fn roster() -> Arc<dyn DirectoryResolver> {
        Arc::new(
            StaticDirectory::new()
                .with_entry("A1", "Alice")
                .with_entry("B2", "Bob"),
        )
    }

    #[tokio::test]
    async fn test_admits_and_freezes_name_and_time() {
        let (controller, store) =
            controller_with(roster(), Arc::new(InMemoryBackend::new())).await;

        let event =
            tokio_test::assert_ok!(controller.submit(&CheckInRequest::new("A1", "gate1")).await);
        assert_eq!(event.display_name, "Alice");
        assert_eq!(event.timestamp, "09:30");
        assert_eq!(store.list().await[0], event);
    }

    #[tokio::test]
    async fn test_invalid_request() {
        let (controller, _) = controller_with(roster(), Arc::new(InMemoryBackend::new())).await;

        let err = controller
            .submit(&CheckInRequest {
                badge_id: Some("A1".into()),
                activity: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::InvalidRequest(ValidationError::Missing("activity"))
        ));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_badge_is_unresolved() {
        let (controller, store) =
            controller_with(roster(), Arc::new(InMemoryBackend::new())).await;

        let err =
            tokio_test::assert_err!(controller.submit(&CheckInRequest::new("Z9", "gate1")).await);
        assert!(matches!(err, AdmissionError::UnresolvedIdentity { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolver_timeout_is_unavailable() {
        let (controller, store) =
            controller_with(Arc::new(SlowDirectory), Arc::new(InMemoryBackend::new())).await;

        let err = controller
            .submit(&CheckInRequest::new("A1", "gate1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::ResolverUnavailable { .. }));
        assert!(err.is_client_error());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_reports_original_timestamp() {
        let backend = Arc::new(InMemoryBackend::new());
        let (controller, store) = controller_with(roster(), backend.clone()).await;
        controller
            .submit(&CheckInRequest::new("A1", "gate1"))
            .await
            .unwrap();

        let later = AdmissionController::new(
            store.clone(),
            roster(),
            Arc::new(FixedClock::at(11, 15).unwrap()),
            Duration::from_millis(100),
        );
        let err = later
            .submit(&CheckInRequest::new("A1", "gate1"))
            .await
            .unwrap_err();

        match &err {
            AdmissionError::DuplicateCheckIn { timestamp, .. } => assert_eq!(timestamp, "09:30"),
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert!(err.to_string().contains("09:30"));
        assert_eq!(store.len().await, 1);
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_admits_nothing() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.set_fail_writes(true);
        let (controller, store) = controller_with(roster(), backend).await;

        let err = controller
            .submit(&CheckInRequest::new("A1", "gate1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdmissionError::PersistenceFailure(_)));
        assert!(!err.is_client_error());
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_request_accepts_scanner_field_name() {
        let request: CheckInRequest =
            serde_json::from_str(r#"{"qrCode": "A1", "activity": "gate1"}"#).unwrap();
        assert_eq!(request.badge_id.as_deref(), Some("A1"));
        assert_eq!(request.key().unwrap().activity(), "gate1");
    }
}
