use std::sync::Arc;

use crate::{SnapshotEntry, Status, Story, StoryId};

/// Number of records materialised per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One position of the ranking: the id and, once fetched, its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSlot {
    pub id: StoryId,
    pub story: Option<Arc<Story>>,
}

impl RankedSlot {
    pub fn unfetched(id: StoryId) -> Self {
        Self { id, story: None }
    }
}

/// A contiguous run of ranking positions to fetch for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub start: usize,
    pub ids: Vec<StoryId>,
}

impl PageRequest {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Ranking, view window and status of a single feed.
///
/// `records` is the view window; its length is the loaded count and
/// `records[i]` corresponds to `ranking[i]` after every successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    page_size: usize,
    pub(crate) ranking: Vec<RankedSlot>,
    pub(crate) records: Vec<Arc<Story>>,
    status: Status,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedState {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ranking: Vec::new(),
            records: Vec::new(),
            status: Status::new(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn ranking(&self) -> &[RankedSlot] {
        &self.ranking
    }

    pub fn ranking_ids(&self) -> Vec<StoryId> {
        self.ranking.iter().map(|slot| slot.id).collect()
    }

    pub fn records(&self) -> &[Arc<Story>] {
        &self.records
    }

    pub fn loaded_count(&self) -> usize {
        self.records.len()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Clears the status left by the previous operation.
    pub fn begin_operation(&mut self) {
        self.status.reset();
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.status.record_failure(message);
    }

    /// Replaces the ranking wholesale and empties the view window.
    pub fn reset_ranking(&mut self, ids: Vec<StoryId>) {
        self.ranking = ids.into_iter().map(RankedSlot::unfetched).collect();
        self.records.clear();
    }

    /// The next `page_size` ranking positions after the view window.
    ///
    /// Near the end of the ranking the request is shorter; past it, empty.
    pub fn next_page(&self) -> PageRequest {
        let start = self.loaded_count().min(self.ranking.len());
        let end = (start + self.page_size).min(self.ranking.len());
        PageRequest {
            start,
            ids: self.ranking[start..end].iter().map(|slot| slot.id).collect(),
        }
    }

    /// Appends a fully fetched page, given in rank order.
    ///
    /// Returns false and leaves the state untouched when the page no longer
    /// lines up with the window or the ranking.
    pub fn apply_page(&mut self, request: &PageRequest, stories: Vec<Arc<Story>>) -> bool {
        let lines_up = request.start == self.loaded_count()
            && stories.len() == request.ids.len()
            && request
                .ids
                .iter()
                .enumerate()
                .all(|(offset, id)| {
                    self.ranking
                        .get(request.start + offset)
                        .is_some_and(|slot| slot.id == *id)
                });
        if !lines_up {
            return false;
        }

        for (offset, story) in stories.into_iter().enumerate() {
            self.ranking[request.start + offset].story = Some(Arc::clone(&story));
            self.records.push(story);
        }
        true
    }

    /// Snapshot of the view window: the loaded records only.
    pub fn window_snapshot(&self) -> Vec<SnapshotEntry> {
        self.records
            .iter()
            .map(|story| SnapshotEntry::Story(Story::clone(story)))
            .collect()
    }

    /// Snapshot of the whole ranking; unfetched positions are bare ids.
    pub fn ranking_snapshot(&self) -> Vec<SnapshotEntry> {
        self.ranking
            .iter()
            .map(|slot| match &slot.story {
                Some(story) => SnapshotEntry::Story(Story::clone(story)),
                None => SnapshotEntry::Id(slot.id),
            })
            .collect()
    }
}
