//! Scheduler operations over a persistent store
//!
//! [`Scheduler`] is what a session driver (the CLI, or any UI) talks to:
//! capture new memories, select the due set, walk a review session, apply
//! ratings. Store failures are never swallowed — every error propagates to
//! the caller, which decides whether to retry. Time is always passed in
//! explicitly so due selection and rating application are functions of
//! (stored state, now).

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;
use thiserror::Error;

use super::algorithm;
use super::session::ReviewSession;
use crate::capture::CaptureRequest;
use crate::memory::{
    MemoryError, MemoryRecord, MemoryStage, MemoryStatus, Rating, RatingBreakdown, StatsSnapshot,
};
use crate::storage::{ExportData, MemoryStore, StoreError};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] MemoryError),

    #[error("Memory not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => SchedulerError::NotFound(id),
            other => SchedulerError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

pub struct Scheduler<S: MemoryStore> {
    store: S,
}

impl<S: MemoryStore> Scheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a memory from captured text.
    ///
    /// Validates the request before touching the store, then persists the
    /// record and bumps the created counter.
    pub async fn capture(&self, request: CaptureRequest, now: DateTime<Utc>) -> Result<MemoryRecord> {
        let id = self.next_id(now).await?;
        let record = MemoryRecord::new(id, request, now)?;

        self.store.put(&record).await?;

        let mut stats = self.store.load_stats().await?;
        stats.created += 1;
        self.store.save_stats(&stats).await?;

        info!("Captured memory {}", record.id);
        Ok(record)
    }

    /// Millisecond-timestamp id; probes the store past any same-millisecond
    /// neighbor so ids stay unique and creation-ordered without process-wide
    /// state.
    async fn next_id(&self, now: DateTime<Utc>) -> Result<String> {
        let mut candidate = now.timestamp_millis();
        loop {
            let id = candidate.to_string();
            match self.store.get(&id).await {
                Err(StoreError::NotFound(_)) => return Ok(id),
                Ok(_) => candidate += 1,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// All active memories with `next_review <= now`, oldest due first.
    ///
    /// Pure in (stored state, now): asking twice without an intervening
    /// rating returns the same set.
    pub async fn due_records(&self, now: DateTime<Utc>) -> Result<Vec<MemoryRecord>> {
        let mut due: Vec<MemoryRecord> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .filter(|m| m.status == MemoryStatus::Active && m.is_due(now))
            .collect();

        due.sort_by(|a, b| a.next_review.cmp(&b.next_review).then_with(|| a.id.cmp(&b.id)));
        Ok(due)
    }

    /// Shuffle the due set into a fresh review session
    pub async fn start_session<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ReviewSession> {
        let due = self.due_records(now).await?;
        let session = ReviewSession::new(due, rng);
        debug!("Started review session {} with {} memories", session.id(), session.len());
        Ok(session)
    }

    /// Apply a rating to a stored memory and write the result back.
    ///
    /// The record write is atomic: on store failure the prior state remains
    /// and the error surfaces here. The aggregate counters are written after
    /// the record (no multi-key transaction is assumed).
    pub async fn apply_rating(
        &self,
        id: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<MemoryRecord> {
        let record = self.store.get(id).await?;
        let updated = algorithm::apply_rating(&record, rating, now);
        self.store.put(&updated).await?;

        let mut stats = self.store.load_stats().await?;
        stats.reviewed += 1;
        stats.streak += 1;
        stats.last_review_date = Some(now);
        self.store.save_stats(&stats).await?;

        debug!(
            "Rated memory {} as {}: interval {}d, ease {:.2}",
            id,
            rating.label(),
            updated.interval,
            updated.ease_factor
        );
        Ok(updated)
    }

    /// Fetch one memory
    pub async fn get(&self, id: &str) -> Result<MemoryRecord> {
        Ok(self.store.get(id).await?)
    }

    /// All memories in creation order
    pub async fn list(&self) -> Result<Vec<MemoryRecord>> {
        let mut records = self.store.get_all().await?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Remove a memory entirely and decrement the created counter
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;

        let mut stats = self.store.load_stats().await?;
        stats.created = stats.created.saturating_sub(1);
        self.store.save_stats(&stats).await?;

        info!("Deleted memory {}", id);
        Ok(())
    }

    /// Keep a memory but exclude it from review
    pub async fn archive(&self, id: &str) -> Result<MemoryRecord> {
        let mut record = self.store.get(id).await?;
        record.status = MemoryStatus::Archived;
        self.store.put(&record).await?;
        Ok(record)
    }

    /// Snapshot of collection-wide statistics
    pub async fn stats_snapshot(&self, now: DateTime<Utc>) -> Result<StatsSnapshot> {
        let records = self.store.get_all().await?;
        let aggregate = self.store.load_stats().await?;

        let mut snapshot = StatsSnapshot {
            total_memories: records.len(),
            due_memories: 0,
            new_memories: 0,
            learning_memories: 0,
            mature_memories: 0,
            relapsed_memories: 0,
            ratings: RatingBreakdown::tally(&records),
            aggregate,
        };

        for record in &records {
            if record.status == MemoryStatus::Active && record.is_due(now) {
                snapshot.due_memories += 1;
            }
            match record.stage() {
                MemoryStage::New => snapshot.new_memories += 1,
                MemoryStage::Learning => snapshot.learning_memories += 1,
                MemoryStage::Mature => snapshot.mature_memories += 1,
                MemoryStage::Relapsed => snapshot.relapsed_memories += 1,
            }
        }

        Ok(snapshot)
    }

    /// Bundle the full state for export
    pub async fn export(&self) -> Result<ExportData> {
        let records = self.list().await?;
        let stats = self.store.load_stats().await?;
        Ok(ExportData::assemble(records, stats))
    }

    /// Replace the full state with an exported document
    pub async fn import(&self, data: ExportData) -> Result<usize> {
        let count = data.memories.len();
        self.store.put_all(&data.memories).await?;
        self.store.save_stats(&data.stats).await?;
        info!("Imported {} memories", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureContext;
    use crate::storage::FileStore;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn create_test_scheduler() -> (Scheduler<FileStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        (Scheduler::new(store), temp_dir)
    }

    #[tokio::test]
    async fn test_capture_persists_and_counts() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let request = CaptureRequest::new("What is ownership?")
            .with_tags(vec!["rust".into()])
            .with_context(CaptureContext {
                url: Some("https://doc.rust-lang.org/book".into()),
                ..Default::default()
            });
        let record = scheduler.capture(request, now).await.unwrap();

        assert_eq!(record.next_review, now);
        let stored = scheduler.get(&record.id).await.unwrap();
        assert_eq!(stored, record);

        let stats = scheduler.store().load_stats().await.unwrap();
        assert_eq!(stats.created, 1);
    }

    #[tokio::test]
    async fn test_capture_empty_front_mutates_nothing() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let result = scheduler.capture(CaptureRequest::new("  "), now).await;
        assert!(matches!(result, Err(SchedulerError::InvalidInput(_))));

        assert!(scheduler.list().await.unwrap().is_empty());
        assert_eq!(scheduler.store().load_stats().await.unwrap().created, 0);
    }

    #[tokio::test]
    async fn test_same_millisecond_ids_stay_unique() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let a = scheduler.capture(CaptureRequest::new("a"), now).await.unwrap();
        let b = scheduler.capture(CaptureRequest::new("b"), now).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(b.id.parse::<i64>().unwrap() > a.id.parse::<i64>().unwrap());
    }

    #[tokio::test]
    async fn test_due_selection_is_idempotent() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        scheduler.capture(CaptureRequest::new("due now"), now).await.unwrap();
        let rated = scheduler.capture(CaptureRequest::new("due later"), now).await.unwrap();
        scheduler.apply_rating(&rated.id, Rating::Good, now).await.unwrap();

        let first = scheduler.due_records(now).await.unwrap();
        let second = scheduler.due_records(now).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].front, "due now");

        // The rated memory comes due a day later
        let tomorrow = now + Duration::days(1);
        assert_eq!(scheduler.due_records(tomorrow).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_archived_memories_are_never_due() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let record = scheduler.capture(CaptureRequest::new("shelved"), now).await.unwrap();
        scheduler.archive(&record.id).await.unwrap();

        assert!(scheduler.due_records(now).await.unwrap().is_empty());
        assert_eq!(scheduler.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_rating_unknown_id_is_not_found() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let result = scheduler.apply_rating("999", Rating::Good, now).await;
        assert!(matches!(result, Err(SchedulerError::NotFound(id)) if id == "999"));
    }

    #[tokio::test]
    async fn test_rating_chain_scenario() {
        let (scheduler, _temp) = create_test_scheduler();
        let t0 = Utc::now();

        let record = scheduler.capture(CaptureRequest::new("chain"), t0).await.unwrap();

        let first = scheduler.apply_rating(&record.id, Rating::Good, t0).await.unwrap();
        assert_eq!(first.interval, 1);
        assert_eq!(first.review_count, 1);
        assert_eq!(first.next_review, t0 + Duration::days(1));

        let t1 = t0 + Duration::days(1);
        let second = scheduler.apply_rating(&record.id, Rating::Good, t1).await.unwrap();
        assert_eq!(second.interval, 3);
        assert_eq!(second.next_review, t1 + Duration::days(3));

        let t2 = t1 + Duration::days(3);
        let third = scheduler.apply_rating(&record.id, Rating::Easy, t2).await.unwrap();
        assert_eq!(third.ease_factor, 2.5);
        assert_eq!(third.interval, 8);
        assert_eq!(third.review_count, 3);

        // Write-back is visible to a fresh read
        let stored = scheduler.get(&record.id).await.unwrap();
        assert_eq!(stored, third);

        let stats = scheduler.store().load_stats().await.unwrap();
        assert_eq!(stats.reviewed, 3);
        assert_eq!(stats.last_review_date, Some(t2));
    }

    #[tokio::test]
    async fn test_session_covers_due_set() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        for i in 0..5 {
            scheduler.capture(CaptureRequest::new(format!("q{}", i)), now).await.unwrap();
        }

        let mut rng = StdRng::seed_from_u64(3);
        let session = scheduler.start_session(now, &mut rng).await.unwrap();
        assert_eq!(session.len(), 5);

        let mut ids: Vec<&str> = session.records().iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_decrements_created() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let record = scheduler.capture(CaptureRequest::new("gone soon"), now).await.unwrap();
        scheduler.delete(&record.id).await.unwrap();

        assert!(matches!(scheduler.get(&record.id).await, Err(SchedulerError::NotFound(_))));
        assert_eq!(scheduler.store().load_stats().await.unwrap().created, 0);

        // Deleting again surfaces NotFound rather than silently succeeding
        assert!(matches!(scheduler.delete(&record.id).await, Err(SchedulerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let (scheduler, _temp) = create_test_scheduler();
        let now = Utc::now();

        let a = scheduler
            .capture(CaptureRequest::new("a").with_tags(vec!["rust".into(), "mem".into()]), now)
            .await
            .unwrap();
        scheduler.capture(CaptureRequest::new("b"), now).await.unwrap();
        scheduler.apply_rating(&a.id, Rating::Hard, now).await.unwrap();

        let exported = scheduler.export().await.unwrap();
        assert_eq!(exported.tags, vec!["mem".to_string(), "rust".to_string()]);

        // Import into a fresh store reproduces every field
        let (other, _temp2) = create_test_scheduler();
        other.import(exported.clone()).await.unwrap();

        let reimported = other.export().await.unwrap();
        assert_eq!(reimported.memories, exported.memories);
        assert_eq!(reimported.stats, exported.stats);
    }
}
