//! Mnema — capture text snippets as memories and review them on a
//! spaced-repetition schedule.
//!
//! The core is the review scheduler: a pure rating transition over per-memory
//! scheduling state (interval, ease factor, due date), plus due-set selection
//! and shuffled session ordering. Capture sources and the persistent store
//! are collaborators behind small contracts ([`capture::CaptureRequest`],
//! [`storage::MemoryStore`]); the bundled CLI is one possible session driver.

pub mod capture;
pub mod memory;
pub mod scheduler;
pub mod storage;

pub use capture::{CaptureContext, CaptureRequest};
pub use memory::{MemoryRecord, Rating};
pub use scheduler::{ReviewSession, Scheduler, SchedulerError};
pub use storage::{FileStore, MemoryStore, StoreError};
