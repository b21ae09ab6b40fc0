use serde::{Deserialize, Serialize};

use crate::{Story, StoryId};

/// One element of the persisted JSON array.
///
/// Fetched positions are written as the record object, positions that were
/// never materialised as the bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotEntry {
    Story(Story),
    Id(StoryId),
}

impl SnapshotEntry {
    pub fn id(&self) -> StoryId {
        match self {
            SnapshotEntry::Story(story) => story.id,
            SnapshotEntry::Id(id) => *id,
        }
    }
}
