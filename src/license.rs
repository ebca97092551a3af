//! License lookup table
//!
//! Items are only ingested when they carry a license marker that resolves to a
//! known `(identifier, version)` pair. Resolution never guesses: anything not
//! in the table yields `None` and the caller skips the item.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use url::Url;

const LICENSE_HOSTS: &[&str] = &["creativecommons.org", "www.creativecommons.org"];

const KNOWN_VERSIONS: &[&str] = &["1.0", "2.0", "2.5", "3.0", "4.0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LicenseKind {
    Cc0,
    Pdm,
    By,
    BySa,
    ByNd,
    ByNc,
    ByNcSa,
    ByNcNd,
}

impl LicenseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseKind::Cc0 => "CC0",
            LicenseKind::Pdm => "PDM",
            LicenseKind::By => "BY",
            LicenseKind::BySa => "BY-SA",
            LicenseKind::ByNd => "BY-ND",
            LicenseKind::ByNc => "BY-NC",
            LicenseKind::ByNcSa => "BY-NC-SA",
            LicenseKind::ByNcNd => "BY-NC-ND",
        }
    }

    fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "by" => Some(LicenseKind::By),
            "by-sa" => Some(LicenseKind::BySa),
            "by-nd" => Some(LicenseKind::ByNd),
            "by-nc" => Some(LicenseKind::ByNc),
            "by-nc-sa" => Some(LicenseKind::ByNcSa),
            "by-nc-nd" => Some(LicenseKind::ByNcNd),
            _ => None,
        }
    }
}

/// A resolved license. Only obtainable through the lookup functions below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct License {
    kind: LicenseKind,
    version: &'static str,
}

impl License {
    pub fn identifier(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier(), self.version)
    }
}

impl Serialize for License {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("License", 2)?;
        state.serialize_field("license", self.identifier())?;
        state.serialize_field("license_version", self.version)?;
        state.end()
    }
}

/// Resolve a license from the host and path of its deed URL
pub fn lookup(host: &str, path: &str) -> Option<License> {
    let host = host.trim().to_ascii_lowercase();
    if !LICENSE_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let path = path.trim().to_ascii_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (kind, version, rest) = match segments.as_slice() {
        ["publicdomain", "zero", version, rest @ ..] => (LicenseKind::Cc0, *version, rest),
        ["publicdomain", "mark", version, rest @ ..] => (LicenseKind::Pdm, *version, rest),
        ["licenses", kind, version, rest @ ..] => {
            (LicenseKind::from_path_segment(kind)?, *version, rest)
        }
        _ => return None,
    };

    if !rest.iter().all(|segment| is_deed_suffix(segment)) || rest.len() > 2 {
        return None;
    }

    let version = match kind {
        // Only 1.0 exists for the public domain tools
        LicenseKind::Cc0 | LicenseKind::Pdm if version != "1.0" => return None,
        _ => KNOWN_VERSIONS.iter().copied().find(|known| *known == version)?,
    };

    Some(License { kind, version })
}

/// Resolve a license from a full deed URL
pub fn from_url(url: &str) -> Option<License> {
    let parsed = Url::parse(url.trim()).ok()?;
    lookup(parsed.host_str()?, parsed.path())
}

/// Resolve a license from the display name a provider API reports.
/// Only public domain dedications are mapped; attribution licenses carry no
/// version in their names and are rejected.
pub fn from_name(name: &str) -> Option<License> {
    let normalized = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match normalized.as_str() {
        "creative commons - public domain dedication"
        | "public domain dedication"
        | "cc0"
        | "cc0 1.0"
        | "cc0 1.0 universal" => Some(License {
            kind: LicenseKind::Cc0,
            version: "1.0",
        }),
        "public domain mark" | "public domain mark 1.0" => Some(License {
            kind: LicenseKind::Pdm,
            version: "1.0",
        }),
        _ => None,
    }
}

/// Jurisdiction ports (`/us/`), deeds (`deed.en`) and legal code pages
fn is_deed_suffix(segment: &str) -> bool {
    segment.starts_with("deed")
        || segment.starts_with("legalcode")
        || (segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic()))
}
