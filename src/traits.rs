//! Traits and interfaces for upstream-agnostic catalog access and sampling

use async_trait::async_trait;
use rand::RngCore;

use crate::error::ProxyResult;
use crate::models::{FilterSpec, GameDetail, GameSummary, PageQuery, Platform, SampleOutcome};

/// How a remote collection lets callers address into its result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Page numbers only, with a maximum reachable page
    Paged { page_cap: u32 },
    /// Direct item offsets into the whole collection
    Offset,
}

/// Configuration for an upstream catalog
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Display name, also stamped on normalized records
    pub name: &'static str,
    /// Base URL of the API, without trailing slash
    pub base_url: String,
    /// Listing page size used when sampling pages
    pub page_size: u32,
    pub addressing: Addressing,
    /// Fields requested on listing queries
    pub summary_fields: &'static [&'static str],
}

/// Trait for remote game catalogs.
///
/// Implementations translate transport failures into typed errors and never
/// retry; the retry policy belongs to the sampler.
#[async_trait]
pub trait GameCatalogClient: Send + Sync {
    /// Get the configuration for this client
    fn config(&self) -> &UpstreamConfig;

    /// Total number of games matching `filters`, via a size-1 probe
    async fn count(&self, filters: &FilterSpec) -> ProxyResult<u64>;

    /// One listing window. An empty result is not an error.
    async fn fetch_page(&self, query: &PageQuery<'_>) -> ProxyResult<Vec<GameSummary>>;

    /// Full record for one game
    async fn fetch_detail(&self, id: &str) -> ProxyResult<GameDetail>;

    /// Live platform listing used by the filter catalog
    async fn fetch_platforms(&self) -> ProxyResult<Vec<Platform>>;

    /// Process filters into URL query pairs, percent-encoding the values
    fn encode_pairs(&self, pairs: &[(&str, String)]) -> String {
        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Decides whether a fetched record is displayable
pub type ValidityPredicate = fn(&GameDetail) -> bool;

/// Strategy that picks one valid game out of a remote collection
#[async_trait]
pub trait Sampler: Send + Sync {
    async fn sample(
        &self,
        client: &dyn GameCatalogClient,
        filters: &FilterSpec,
        is_valid: ValidityPredicate,
        rng: &mut (dyn RngCore + Send),
    ) -> ProxyResult<SampleOutcome>;
}
