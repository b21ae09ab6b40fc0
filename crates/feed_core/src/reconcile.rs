//! Refresh reconciliation.
//!
//! A refresh compares the stored ranking with a freshly fetched one position
//! by position. Only positions inside the view window whose id changed are
//! fetched; everything else is carried over from the previous ranking.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{FeedState, RankedSlot, Story, StoryId};

/// A ranking position whose record must be fetched before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedFetch {
    pub position: usize,
    pub id: StoryId,
}

/// The fetches a refresh needs, ordered by position in the new ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPlan {
    new_ids: Vec<StoryId>,
    fetches: Vec<PlannedFetch>,
}

impl RefreshPlan {
    pub fn new_ids(&self) -> &[StoryId] {
        &self.new_ids
    }

    pub fn fetches(&self) -> &[PlannedFetch] {
        &self.fetches
    }
}

/// Computes which in-view positions of `new_ids` hold a different id than
/// the same position of `old`.
///
/// Comparison is positional: an id that merely moved is still planned at its
/// new position unless it landed on its old index.
pub fn plan_refresh(old: &[RankedSlot], new_ids: Vec<StoryId>, loaded_count: usize) -> RefreshPlan {
    let fetches = new_ids
        .iter()
        .copied()
        .enumerate()
        .take(loaded_count)
        .filter(|(position, id)| old.get(*position).map(|slot| slot.id) != Some(*id))
        .map(|(position, id)| PlannedFetch { position, id })
        .collect();

    RefreshPlan { new_ids, fetches }
}

impl FeedState {
    pub fn plan_refresh(&self, new_ids: Vec<StoryId>) -> RefreshPlan {
        plan_refresh(&self.ranking, new_ids, self.loaded_count())
    }

    /// Merges a refresh into the state.
    ///
    /// `fetched` maps a planned position to the record fetched for it; failed
    /// fetches are expected as stubs. Ids already present anywhere in the old
    /// ranking keep their old record. The view window keeps its length
    /// (bounded by the new ranking) and falls back to the record previously
    /// shown at a position when the merged one is a stub.
    pub fn apply_refresh(&mut self, plan: RefreshPlan, mut fetched: BTreeMap<usize, Arc<Story>>) {
        let mut old_positions: HashMap<StoryId, usize> = HashMap::with_capacity(self.ranking.len());
        for (position, slot) in self.ranking.iter().enumerate() {
            old_positions.entry(slot.id).or_insert(position);
        }

        let ranking: Vec<RankedSlot> = plan
            .new_ids
            .into_iter()
            .enumerate()
            .map(|(position, id)| {
                let fresh = fetched.remove(&position);
                let cached = old_positions
                    .get(&id)
                    .and_then(|old| self.ranking[*old].story.clone());
                let story = match (cached, fresh) {
                    (Some(cached), _) if !cached.is_stub() => Some(cached),
                    (cached, Some(fresh)) => {
                        if fresh.is_stub() {
                            cached.or(Some(fresh))
                        } else {
                            Some(fresh)
                        }
                    }
                    (cached, None) => cached,
                };
                RankedSlot { id, story }
            })
            .collect();

        let loaded = self.records.len().min(ranking.len());
        let records: Vec<Arc<Story>> = ranking[..loaded]
            .iter()
            .enumerate()
            .map(|(position, slot)| match &slot.story {
                Some(story) if !story.is_stub() => Arc::clone(story),
                merged => self
                    .records
                    .get(position)
                    .or(merged.as_ref())
                    .cloned()
                    .unwrap_or_else(|| Arc::new(Story::stub(slot.id))),
            })
            .collect();

        self.ranking = ranking;
        self.records = records;
    }
}
