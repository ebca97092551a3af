//! Thingiverse API provider
//!
//! Walks the `newest` listing page by page, keeps the things added inside the
//! run window and emits one record per image-bearing file of every CC0 thing.
//! All API requests carry the access token; the API rate limit is 300 requests
//! per five minutes, which the requester's spacing respects.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::traits::{Provider, ProviderError};
use super::types::{
    Creator, IngestContext, IngestTarget, MediaRecord, MetaData, Tag, normalize_tags,
    render_template,
};
use crate::config::ThingiverseSettings;
use crate::fetch::{
    FetchError, PageSource, PaginationConfig, QueryParams, Requester, RetryPolicy,
    collect_window, get_json,
};
use crate::license::{self, License};
use crate::observability::RunStats;
use crate::window::{PageWindow, WindowPosition, parse_timestamp};

pub const PROVIDER: &str = "thingiverse";

pub struct Thingiverse {
    requester: Arc<dyn Requester>,
    settings: ThingiverseSettings,
    retry: RetryPolicy,
}

impl Thingiverse {
    pub fn new(
        requester: Arc<dyn Requester>,
        settings: ThingiverseSettings,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            requester,
            settings,
            retry,
        }
    }

    fn default_query_params(&self) -> QueryParams {
        QueryParams::from([(
            "access_token".to_string(),
            self.settings.access_token.clone(),
        )])
    }

    /// Listing query for `page`
    pub fn build_query_params(&self, page: u32) -> QueryParams {
        let mut params = self.default_query_params();
        params.insert("per_page".to_string(), self.settings.per_page.to_string());
        params.insert("page".to_string(), page.to_string());
        params
    }

    /// Endpoint and query for a single thing
    pub fn build_thing_query(&self, thing_id: &str) -> (String, QueryParams) {
        (self.thing_url(thing_id, None), self.default_query_params())
    }

    fn thing_url(&self, thing_id: &str, resource: Option<&str>) -> String {
        let base = self.settings.api_base.trim_end_matches('/');
        match resource {
            Some(resource) => format!("{}/things/{}/{}", base, thing_id, resource),
            None => format!("{}/things/{}", base, thing_id),
        }
    }

    async fn get(&self, url: &str, params: &QueryParams) -> Result<Value, FetchError> {
        get_json(self.requester.as_ref(), url, params, self.retry).await
    }

    async fn get_list(&self, url: &str) -> Result<Vec<Value>, FetchError> {
        match self.get(url, &self.default_query_params()).await? {
            Value::Array(items) => Ok(items),
            _ => Err(not_a_list(url)),
        }
    }

    /// Tags of a thing, trimmed and sorted by name
    pub async fn get_tags(&self, thing_id: &str) -> Result<Vec<Tag>, FetchError> {
        info!(thing = thing_id, "Requesting tags");
        let url = self.thing_url(thing_id, Some("tags"));
        let tags = self.get_list(&url).await?;

        Ok(normalize_tags(
            tags.iter().filter_map(|tag| tag.get("name").and_then(Value::as_str)),
            PROVIDER,
        ))
    }

    pub async fn get_files(&self, thing_id: &str) -> Result<Vec<Value>, FetchError> {
        let url = self.thing_url(thing_id, Some("files"));
        let files = self.get_list(&url).await?;
        if files.is_empty() {
            warn!(thing = thing_id, "No files listed");
        }
        Ok(files)
    }

    async fn process_thing(
        &self,
        thing: &Value,
        stats: &RunStats,
    ) -> Result<Vec<MediaRecord>, FetchError> {
        stats.item_seen();

        let Some(data) = parse_thing(thing, &self.settings) else {
            stats.item_rejected();
            return Ok(Vec::new());
        };

        info!(thing = %data.id, "Processing thing");
        let tags = self.get_tags(&data.id).await?;
        let files = self.get_files(&data.id).await?;

        let records = build_records(&data, &tags, &files);
        if records.is_empty() {
            warn!(thing = %data.id, "No media content found");
            stats.item_rejected();
        }
        stats.records_emitted(records.len());

        Ok(records)
    }
}

#[async_trait]
impl Provider for Thingiverse {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn ingest(&self, ctx: IngestContext) -> Result<Vec<MediaRecord>, ProviderError> {
        let IngestTarget::Window(window) = &ctx.target else {
            return Err(ProviderError::UnsupportedTarget {
                provider: PROVIDER,
                reason: "expected a date window".to_string(),
            });
        };

        info!(
            run_id = %ctx.run_id,
            start = window.start(),
            end = window.end(),
            "Processing Thingiverse API"
        );

        let listing = NewestThings {
            provider: self,
            window,
            stats: &ctx.stats,
        };
        let config = PaginationConfig {
            start_page: self.settings.start_page,
            max_items: Some(self.settings.max_things),
        };
        let things = collect_window(&listing, window, config).await?;

        let mut records = Vec::new();
        for thing in &things {
            records.extend(self.process_thing(thing, &ctx.stats).await?);
        }

        info!(run_id = %ctx.run_id, things = things.len(), records = records.len(), "Terminated");
        Ok(records)
    }
}

/// The `newest` listing, resolved to full thing details.
///
/// Details are resolved in listing order and resolution stops at the first
/// thing older than the window, so the rest of that page is never requested.
struct NewestThings<'a> {
    provider: &'a Thingiverse,
    window: &'a PageWindow,
    stats: &'a RunStats,
}

#[async_trait]
impl<'a> PageSource for NewestThings<'a> {
    type Item = Value;

    async fn fetch_page(&self, page: u32) -> Result<Vec<Value>, FetchError> {
        let endpoint = &self.provider.settings.endpoint;
        let params = self.provider.build_query_params(page);
        let listing = self.provider.get(endpoint, &params).await?;
        self.stats.page_fetched();

        let Value::Array(listed) = listing else {
            return Err(not_a_list(endpoint));
        };

        let mut things = Vec::with_capacity(listed.len());
        for summary in &listed {
            let Some(id) = json_id(summary.get("id")) else {
                warn!(page, "Listed thing has no id, skipping");
                continue;
            };

            let (url, params) = self.provider.build_thing_query(&id);
            let thing = self.provider.get(&url, &params).await?;
            let too_old = self
                .timestamp(&thing)
                .is_some_and(|ts| self.window.position(ts) == WindowPosition::Before);
            things.push(thing);

            if too_old {
                debug!(page, thing = %id, "Thing older than window, rest of page not resolved");
                break;
            }
        }

        Ok(things)
    }

    fn timestamp(&self, item: &Value) -> Option<i64> {
        ["added", "modified"]
            .iter()
            .filter_map(|key| item.get(*key).and_then(Value::as_str))
            .find_map(parse_timestamp)
    }
}

/// Thing-level fields shared by every record of the thing
#[derive(Debug, Clone, PartialEq)]
struct ThingData {
    id: String,
    license: License,
    title: String,
    description: String,
    landing_url: String,
    creator: Creator,
}

fn parse_thing(thing: &Value, settings: &ThingiverseSettings) -> Option<ThingData> {
    let Some(id) = json_id(thing.get("id")) else {
        warn!("Thing has no identifier, skipping");
        return None;
    };

    let Some(license) = validate_license(thing) else {
        warn!(thing = %id, "License not detected");
        return None;
    };

    Some(ThingData {
        license,
        title: string_or_empty(thing, "name"),
        description: string_or_empty(thing, "description"),
        landing_url: build_landing_url(thing, &id, settings),
        creator: build_creator(thing, settings),
        id,
    })
}

fn validate_license(thing: &Value) -> Option<License> {
    let marker = thing.get("license").and_then(Value::as_str)?;
    license::from_name(marker).or_else(|| license::from_url(marker))
}

fn build_landing_url(thing: &Value, id: &str, settings: &ThingiverseSettings) -> String {
    match non_blank(thing, "public_url") {
        Some(url) => url.to_string(),
        None => render_template(&settings.landing_url_template, id),
    }
}

fn build_creator(thing: &Value, settings: &ThingiverseSettings) -> Creator {
    let fallback = || Creator::fallback(&settings.default_creator, &settings.creator_url_template);

    let Some(creator) = thing.get("creator").filter(|c| c.is_object()) else {
        return fallback();
    };

    let account = non_blank(creator, "name");
    let full_name = match (non_blank(creator, "first_name"), non_blank(creator, "last_name")) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        _ => None,
    };

    let Some(name) = full_name.or_else(|| account.map(str::to_string)) else {
        return fallback();
    };

    Creator {
        name: Some(name),
        url: non_blank(creator, "public_url").map(str::to_string),
    }
}

/// `(thumbnail, image_url)` from the display sizes of an image; the image
/// falls back to the thumbnail
fn image_urls(sizes: &[Value]) -> (Option<String>, Option<String>) {
    let mut thumbnail = None;
    let mut image = None;

    for size in sizes {
        let is_display = size
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("display"));
        if !is_display {
            continue;
        }

        let url = non_blank(size, "url").map(str::to_string);
        match size.get("size").and_then(Value::as_str).map(str::to_lowercase).as_deref() {
            Some("medium") => thumbnail = url,
            Some("large") => image = url,
            _ => {}
        }
    }

    let image = image.or_else(|| thumbnail.clone());
    (thumbnail, image)
}

fn build_records(data: &ThingData, tags: &[Tag], files: &[Value]) -> Vec<MediaRecord> {
    files
        .iter()
        .filter_map(|file| {
            let Some(default_image) = file.get("default_image").filter(|d| d.is_object()) else {
                warn!(thing = %data.id, "Not a valid image");
                return None;
            };

            let Some(model_url) = non_blank(default_image, "url") else {
                warn!(thing = %data.id, "3D model not detected");
                return None;
            };

            let sizes = default_image
                .get("sizes")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let (thumbnail, image_url) = image_urls(sizes);

            let Some(image_url) = image_url else {
                warn!(thing = %data.id, "Image not detected");
                return None;
            };

            let foreign_identifier =
                json_id(default_image.get("id")).unwrap_or_else(|| image_url.clone());

            let meta_data = MetaData::from([
                ("description".to_string(), data.description.clone()),
                ("3d_model".to_string(), model_url.to_string()),
            ]);

            Some(MediaRecord {
                provider: PROVIDER.to_string(),
                source: PROVIDER.to_string(),
                foreign_identifier,
                foreign_landing_url: data.landing_url.clone(),
                image_url,
                thumbnail_url: thumbnail,
                width: None,
                height: None,
                title: data.title.clone(),
                creator: data.creator.name.clone(),
                creator_url: data.creator.url.clone(),
                license: data.license,
                tags: tags.to_vec(),
                meta_data,
            })
        })
        .collect()
}

/// Records for one thing given its tags and files. Pure: the same inputs
/// always give the same records.
pub fn extract_records(
    thing: &Value,
    tags: &[Tag],
    files: &[Value],
    settings: &ThingiverseSettings,
) -> Vec<MediaRecord> {
    parse_thing(thing, settings)
        .map(|data| build_records(&data, tags, files))
        .unwrap_or_default()
}

fn not_a_list(url: &str) -> FetchError {
    FetchError::UnexpectedShape {
        url: url.to_string(),
        reason: "expected a JSON list".to_string(),
    }
}

fn json_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn non_blank<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn string_or_empty(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
