//! Feed engine: remote sources, snapshot cache and operation orchestration.
mod config;
mod engine;
mod feed;
mod fetch;
mod persist;
mod types;

pub use config::{EngineConfig, BEST_STORIES_KEY, DEFAULT_API_BASE};
pub use engine::EngineHandle;
pub use feed::FeedEngine;
pub use fetch::{FetchSettings, ReqwestSource, StorySource};
pub use persist::{
    ensure_cache_dir, AtomicFileWriter, FileSnapshotStore, MemorySnapshotStore, PersistError,
    SnapshotStore,
};
pub use types::{EngineError, FailureKind, FeedEvent, FetchError};

pub use feed_core::{Operation, SnapshotEntry, Status, Story, StoryId};
