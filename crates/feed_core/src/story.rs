use serde::{Deserialize, Serialize};

/// Numeric handle naming one item in the remote feed.
pub type StoryId = u64;

/// A fetched record.
///
/// Every content field is optional: a record whose fetch failed, or whose id
/// the remote does not know, degrades to a stub carrying only its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Total comment count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descendants: Option<u32>,
    /// Direct children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kids: Vec<StoryId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Story {
    pub fn stub(id: StoryId) -> Self {
        Self {
            id,
            title: None,
            url: None,
            score: None,
            by: None,
            time: None,
            descendants: None,
            kids: Vec::new(),
            kind: None,
        }
    }

    /// True when no content field is present.
    pub fn is_stub(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.score.is_none()
            && self.by.is_none()
            && self.time.is_none()
            && self.descendants.is_none()
            && self.kids.is_empty()
            && self.kind.is_none()
    }

    /// Host part of the external link, without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        let parsed = url::Url::parse(self.url.as_deref()?).ok()?;
        let host = parsed.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }
}
