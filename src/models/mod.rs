//! Data models for filter selections, upstream listings and normalized game records

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// A filter dimension understood by the upstream catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Genres,
    Concepts,
    Platforms,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Genres, Dimension::Concepts, Dimension::Platforms];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Genres => "genres",
            Dimension::Concepts => "concepts",
            Dimension::Platforms => "platforms",
        }
    }
}

/// Filter constraints for one sampling request.
///
/// Dimensions without identifiers are not stored, so an empty spec means
/// "anything goes".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    dimensions: BTreeMap<Dimension, Vec<String>>,
}

impl FilterSpec {
    /// Builds a spec from raw query parameters. Values are comma-joined
    /// identifier lists; unknown parameter names are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut spec = Self::default();
        for dimension in Dimension::ALL {
            if let Some(raw) = params.get(dimension.as_str()) {
                spec = spec.with(dimension, split_ids(raw));
            }
        }
        spec
    }

    pub fn with<I, S>(mut self, dimension: Dimension, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            self.dimensions.remove(&dimension);
        } else {
            self.dimensions.insert(dimension, ids);
        }
        self
    }

    pub fn get(&self, dimension: Dimension) -> Option<&[String]> {
        self.dimensions.get(&dimension).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &[String])> {
        self.dimensions.iter().map(|(d, ids)| (*d, ids.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Where a listing window starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based page number
    Page(u32),
    /// 0-based item offset
    Offset(u64),
}

/// One listing request against a remote collection
#[derive(Debug, Clone)]
pub struct PageQuery<'a> {
    pub filters: &'a FilterSpec,
    pub page_size: u32,
    pub position: Position,
    pub fields: &'a [&'a str],
}

/// Lightweight listing record; carries no display guarantees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub id: String,
    pub name: Option<String>,
}

/// Full game record normalized across upstreams
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub released: Option<String>,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub site_url: Option<String>,
    pub source: &'static str,
}

/// Terminal result of one sampler invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Found(GameDetail),
    NotFound,
    ExhaustedRetries { attempts: u32 },
}

/// Platform entry from a live upstream listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub id: u32,
    pub name: String,
    pub release_year: Option<i32>,
}

/// Curated `id` + display name pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub id: u32,
    pub name: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformBuckets {
    pub primary: Vec<Platform>,
    /// Non-primary platforms keyed by release year, or `"unknown"`
    pub other: BTreeMap<String, Vec<Platform>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCatalog {
    pub genres: Vec<FilterOption>,
    pub concepts: Vec<FilterOption>,
    pub platforms: PlatformBuckets,
}
