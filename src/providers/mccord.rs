//! McCord Museum collection pages
//!
//! Each page describes a single artwork. Pages are fetched one at a time and
//! parsed with CSS selectors; a page without a resolvable Creative Commons
//! license, an image or an identifier yields no record.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};
use url::Url;

use super::traits::{Provider, ProviderError};
use super::types::{
    Creator, IngestContext, IngestTarget, MediaRecord, MetaData, normalize_tags,
};
use crate::config::McCordSettings;
use crate::fetch::{FetchError, QueryParams, Requester, RetryPolicy, get_text};
use crate::license::{self, License};

pub const PROVIDER: &str = "mccordmuseum";
pub const SOURCE: &str = "commoncrawl";

static FOREIGN_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?/([A-Z]-?\d+(?:\.\d+)*)/?$").expect("foreign id regex should compile")
});

/// Object identifier at the end of a collection URL, e.g. `M2001.30.3`
pub fn foreign_id_from_url(url: &str) -> Option<String> {
    FOREIGN_ID_PATTERN
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub struct McCordMuseum {
    requester: Arc<dyn Requester>,
    settings: McCordSettings,
    retry: RetryPolicy,
}

impl McCordMuseum {
    pub fn new(requester: Arc<dyn Requester>, settings: McCordSettings, retry: RetryPolicy) -> Self {
        Self {
            requester,
            settings,
            retry,
        }
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        get_text(self.requester.as_ref(), url, &QueryParams::new(), self.retry).await
    }

    /// Record for one collection page, `None` when the page is rejected
    pub fn extract(&self, html: &str, url: &str) -> Option<MediaRecord> {
        let document = Html::parse_document(html);

        let Some(license) = self.extract_license(&document) else {
            warn!(url, "License not detected");
            return None;
        };

        let Some(image) = self.extract_image(&document) else {
            warn!(url, "Image not detected");
            return None;
        };

        let (heading_id, title) = extract_heading(&document);
        let Some(foreign_identifier) = heading_id.or_else(|| foreign_id_from_url(url)) else {
            warn!(url, "Identifier not detected");
            return None;
        };

        let tags = normalize_tags(
            select_all(&document, r#"a[title="All tagged images"]"#)
                .into_iter()
                .map(element_text),
            PROVIDER,
        );

        let creator = self.extract_creator(&document);

        let mut meta_data = MetaData::new();
        if let Some(alt) = image.alt {
            meta_data.insert("image_alt_text".to_string(), alt);
        }
        if let Some(description) = select_first(&document, "div#descriptions")
            .map(element_text)
            .filter(|text| !text.is_empty())
        {
            meta_data.insert("description".to_string(), description);
        }

        Some(MediaRecord {
            provider: PROVIDER.to_string(),
            source: SOURCE.to_string(),
            foreign_identifier,
            foreign_landing_url: url.to_string(),
            thumbnail_url: Some(image.url.replace("/ObjView/", "/ListView/")),
            image_url: image.url,
            width: image.width,
            height: image.height,
            title,
            creator: creator.name,
            creator_url: creator.url,
            license,
            tags,
            meta_data,
        })
    }

    fn extract_license(&self, document: &Html) -> Option<License> {
        let anchor = select_first(document, r#"a[rel="license"][href]"#)?;
        license::from_url(anchor.value().attr("href")?)
    }

    fn extract_image(&self, document: &Html) -> Option<PageImage> {
        let img = select_first(document, "div.image img")?;
        let src = non_blank(img.value().attr("src"))?;

        Some(PageImage {
            url: self.resolve(src)?,
            width: non_blank(img.value().attr("width")).and_then(|w| w.parse().ok()),
            height: non_blank(img.value().attr("height")).and_then(|h| h.parse().ok()),
            alt: non_blank(img.value().attr("alt")).map(str::to_string),
        })
    }

    fn extract_creator(&self, document: &Html) -> Creator {
        let artist = select_first(document, r#"div#etiquette a[href*="tablename=artist"]"#);

        let name = artist
            .map(element_text)
            .and_then(|text| text.split(" (").next().map(|n| n.trim().to_string()))
            .filter(|name| !name.is_empty());

        match name {
            Some(name) => Creator {
                name: Some(name),
                url: artist
                    .and_then(|a| non_blank(a.value().attr("href")))
                    .and_then(|href| self.resolve(href)),
            },
            None => Creator {
                name: self.settings.default_creator.clone(),
                url: None,
            },
        }
    }

    fn resolve(&self, link: &str) -> Option<String> {
        let base = Url::parse(&self.settings.domain).ok()?;
        base.join(link).ok().map(String::from)
    }
}

#[async_trait]
impl Provider for McCordMuseum {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn ingest(&self, ctx: IngestContext) -> Result<Vec<MediaRecord>, ProviderError> {
        let IngestTarget::Pages(urls) = &ctx.target else {
            return Err(ProviderError::UnsupportedTarget {
                provider: PROVIDER,
                reason: "expected page URLs".to_string(),
            });
        };

        info!(run_id = %ctx.run_id, pages = urls.len(), "Processing McCord Museum pages");

        let mut records = Vec::new();
        for url in urls {
            let html = self.fetch_page(url).await?;
            ctx.stats.page_fetched();
            ctx.stats.item_seen();

            match self.extract(&html, url) {
                Some(record) => {
                    ctx.stats.records_emitted(1);
                    records.push(record);
                }
                None => ctx.stats.item_rejected(),
            }
        }

        Ok(records)
    }
}

struct PageImage {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
    alt: Option<String>,
}

/// `(identifier, title)` from the `h1.vo` heading, formatted `id | title`
fn extract_heading(document: &Html) -> (Option<String>, String) {
    let Some(heading) = select_first(document, "h1.vo").map(element_text) else {
        return (None, String::new());
    };

    match heading.split_once('|') {
        Some((id, title)) => {
            let title = title.split('|').next().unwrap_or_default().trim().to_string();
            let id = Some(id.trim().to_string()).filter(|id| !id.is_empty());
            (id, title)
        }
        None => (None, heading.trim().to_string()),
    }
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Element text with whitespace runs collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
