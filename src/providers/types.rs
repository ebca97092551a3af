use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::license::License;
use crate::observability::RunStats;
use crate::window::PageWindow;

/// Free-form per-record metadata (description, alt text, model URL, ...)
pub type MetaData = BTreeMap<String, String>;

/// A provider tag attached to a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub provider: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
        }
    }
}

/// Trim tag names, drop empty ones and sort by name
pub fn normalize_tags<I>(names: I, provider: &str) -> Vec<Tag>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut tags: Vec<Tag> = names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .map(|name| Tag::new(name, provider))
        .collect();
    tags.sort_by(|a, b| a.name.cmp(&b.name));
    tags
}

/// Creator name and profile link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Creator {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl Creator {
    /// Provider account used when an item names no creator
    pub fn fallback(default_name: &str, url_template: &str) -> Self {
        Self {
            name: Some(default_name.to_string()),
            url: Some(render_template(url_template, default_name)),
        }
    }
}

/// Substitute the first `{}` in `template`
pub fn render_template(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}

/// Normalized metadata for one media asset.
///
/// Construction requires a resolved [`License`], so every record carries one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRecord {
    pub provider: String,
    pub source: String,
    pub foreign_identifier: String,
    pub foreign_landing_url: String,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: String,
    pub creator: Option<String>,
    pub creator_url: Option<String>,
    #[serde(flatten)]
    pub license: License,
    pub tags: Vec<Tag>,
    pub meta_data: MetaData,
}

/// What a run should ingest
#[derive(Debug, Clone, PartialEq)]
pub enum IngestTarget {
    /// Listing items timestamped inside the window
    Window(PageWindow),
    /// Individual pages
    Pages(Vec<String>),
}

/// Context passed to a provider for one run
#[derive(Debug, Clone)]
pub struct IngestContext {
    pub run_id: Uuid,
    pub target: IngestTarget,
    pub stats: Arc<RunStats>,
}

impl IngestContext {
    pub fn new(target: IngestTarget) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            target,
            stats: Arc::new(RunStats::new()),
        }
    }

    pub fn for_window(window: PageWindow) -> Self {
        Self::new(IngestTarget::Window(window))
    }

    pub fn for_pages<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(IngestTarget::Pages(urls.into_iter().map(Into::into).collect()))
    }
}
