//! # Random Valid Game Sampler
//!
//! Picks one displayable game out of a large, paginated remote collection
//! that has no "random item" primitive of its own. Validity can only be
//! judged on the full record, so every candidate costs a listing call plus a
//! detail call. The number of candidates tried per request is bounded by a
//! [`RetryBudget`], which caps both latency and upstream load:
//!
//! - one count probe
//! - at most `budget` listing + detail pairs
//!
//! Two addressing strategies are supported, matching what each upstream
//! allows:
//!
//! - [`RandomPageSampler`]: random page in `[1, max_page]`, then a random
//!   entry of that page. Upstreams that refuse to paginate past a fixed
//!   depth make games beyond `page_cap * page_size` unreachable.
//! - [`RandomOffsetSampler`]: random offset in `[0, count)`, fetched as a
//!   single-item window.
//!
//! ## Failure policy
//!
//! A failed count probe aborts the call, since no candidate can be drawn
//! without it. Inside an attempt, transport errors, malformed bodies and
//! timeouts are logged and charged to the budget like an invalid candidate.
//! Both strategies report `NotFound` for an empty collection and
//! `ExhaustedRetries` when the budget runs out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, RngCore};
use tracing::{debug, info, warn};

use crate::error::{ProxyError, ProxyResult};
use crate::models::{FilterSpec, GameDetail, GameSummary, PageQuery, Position, SampleOutcome};
use crate::traits::{Addressing, GameCatalogClient, Sampler, UpstreamConfig, ValidityPredicate};

pub const DEFAULT_RETRY_BUDGET: u32 = 5;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(8);

/// Maximum number of sampling attempts per invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget(u32);

impl RetryBudget {
    /// A budget of zero is raised to one attempt
    pub fn new(attempts: u32) -> Self {
        Self(attempts.max(1))
    }

    pub fn attempts(self) -> u32 {
        self.0
    }

    /// Upper bound on upstream calls for one invocation
    pub fn max_upstream_calls(self) -> u32 {
        2 * self.0 + 1
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self(DEFAULT_RETRY_BUDGET)
    }
}

/// Highest page that can be drawn for `count` matches
pub fn max_page(count: u64, page_size: u32, page_cap: u32) -> u32 {
    let pages = count.div_ceil(u64::from(page_size.max(1)));
    // bounded by page_cap, so the narrowing cannot truncate
    pages.min(u64::from(page_cap)) as u32
}

/// Builds the strategy matching how `config`'s upstream is addressed
pub fn sampler_for(
    config: &UpstreamConfig,
    budget: RetryBudget,
    attempt_timeout: Duration,
) -> Arc<dyn Sampler> {
    match config.addressing {
        Addressing::Paged { page_cap } => Arc::new(RandomPageSampler {
            budget,
            attempt_timeout,
            page_size: config.page_size,
            page_cap,
        }),
        Addressing::Offset => Arc::new(RandomOffsetSampler {
            budget,
            attempt_timeout,
        }),
    }
}

/// What one attempt produced
enum Attempt {
    Valid(GameDetail),
    Invalid(String),
    EmptyWindow,
}

/// Fetches the detail for `candidate` and checks it against `is_valid`
async fn inspect(
    client: &dyn GameCatalogClient,
    candidate: &GameSummary,
    is_valid: ValidityPredicate,
) -> ProxyResult<Attempt> {
    debug!(
        "Checking candidate {} ({})",
        candidate.id,
        candidate.name.as_deref().unwrap_or("unnamed")
    );
    let detail = client.fetch_detail(&candidate.id).await?;
    if is_valid(&detail) {
        Ok(Attempt::Valid(detail))
    } else {
        Ok(Attempt::Invalid(detail.id))
    }
}

/// Runs one attempt under the per-attempt timeout. `Some` ends the sampling.
async fn settle<F>(
    upstream: &str,
    attempt_no: u32,
    attempt_timeout: Duration,
    attempt: F,
) -> Option<GameDetail>
where
    F: Future<Output = ProxyResult<Attempt>>,
{
    let result = tokio::time::timeout(attempt_timeout, attempt)
        .await
        .unwrap_or_else(|_| Err(ProxyError::AttemptTimeout(attempt_timeout)));

    match result {
        Ok(Attempt::Valid(detail)) => {
            info!(
                "Found game {} on {} after {} attempt(s)",
                detail.id, upstream, attempt_no
            );
            Some(detail)
        }
        Ok(Attempt::Invalid(id)) => {
            debug!("Attempt {}: game {} on {} is not displayable", attempt_no, id, upstream);
            None
        }
        Ok(Attempt::EmptyWindow) => {
            debug!("Attempt {}: empty listing window on {}", attempt_no, upstream);
            None
        }
        Err(e) => {
            if let ProxyError::UpstreamTransport { status, body } = &e {
                warn!(
                    "Attempt {} on {} failed with status {}: {}",
                    attempt_no, upstream, status, body
                );
            } else {
                warn!("Attempt {} on {} failed: {}", attempt_no, upstream, e);
            }
            None
        }
    }
}

/// Random page + in-page pick, for upstreams that only paginate by page number
#[derive(Debug, Clone)]
pub struct RandomPageSampler {
    pub budget: RetryBudget,
    pub attempt_timeout: Duration,
    pub page_size: u32,
    pub page_cap: u32,
}

impl RandomPageSampler {
    async fn attempt(
        &self,
        client: &dyn GameCatalogClient,
        filters: &FilterSpec,
        page: u32,
        pick: &mut (dyn RngCore + Send),
        is_valid: ValidityPredicate,
    ) -> ProxyResult<Attempt> {
        let query = PageQuery {
            filters,
            page_size: self.page_size,
            position: Position::Page(page),
            fields: client.config().summary_fields,
        };
        let summaries = client.fetch_page(&query).await?;
        if summaries.is_empty() {
            return Ok(Attempt::EmptyWindow);
        }

        let candidate = &summaries[pick.random_range(0..summaries.len())];
        inspect(client, candidate, is_valid).await
    }
}

#[async_trait]
impl Sampler for RandomPageSampler {
    async fn sample(
        &self,
        client: &dyn GameCatalogClient,
        filters: &FilterSpec,
        is_valid: ValidityPredicate,
        rng: &mut (dyn RngCore + Send),
    ) -> ProxyResult<SampleOutcome> {
        let upstream = client.config().name;
        let count = client.count(filters).await?;
        if count == 0 {
            info!("No games on {} match {:?}", upstream, filters);
            return Ok(SampleOutcome::NotFound);
        }

        let max_page = max_page(count, self.page_size, self.page_cap);
        info!(
            "Sampling {} of {} matching games on {} ({} reachable pages)",
            self.budget.attempts(),
            count,
            upstream,
            max_page
        );

        for attempt_no in 1..=self.budget.attempts() {
            let page = rng.random_range(1..=max_page);
            let attempt = self.attempt(client, filters, page, rng, is_valid);
            if let Some(detail) = settle(upstream, attempt_no, self.attempt_timeout, attempt).await
            {
                return Ok(SampleOutcome::Found(detail));
            }
        }

        warn!(
            "No displayable game on {} after {} attempts",
            upstream,
            self.budget.attempts()
        );
        Ok(SampleOutcome::ExhaustedRetries {
            attempts: self.budget.attempts(),
        })
    }
}

/// Random offset + single-item window, for upstreams with direct offsets
#[derive(Debug, Clone)]
pub struct RandomOffsetSampler {
    pub budget: RetryBudget,
    pub attempt_timeout: Duration,
}

impl RandomOffsetSampler {
    async fn attempt(
        &self,
        client: &dyn GameCatalogClient,
        filters: &FilterSpec,
        offset: u64,
        is_valid: ValidityPredicate,
    ) -> ProxyResult<Attempt> {
        let query = PageQuery {
            filters,
            page_size: 1,
            position: Position::Offset(offset),
            fields: client.config().summary_fields,
        };
        let summaries = client.fetch_page(&query).await?;
        match summaries.first() {
            Some(candidate) => inspect(client, candidate, is_valid).await,
            None => Ok(Attempt::EmptyWindow),
        }
    }
}

#[async_trait]
impl Sampler for RandomOffsetSampler {
    async fn sample(
        &self,
        client: &dyn GameCatalogClient,
        filters: &FilterSpec,
        is_valid: ValidityPredicate,
        rng: &mut (dyn RngCore + Send),
    ) -> ProxyResult<SampleOutcome> {
        let upstream = client.config().name;
        let count = client.count(filters).await?;
        if count == 0 {
            info!("No games on {} match {:?}", upstream, filters);
            return Ok(SampleOutcome::NotFound);
        }

        info!(
            "Sampling {} of {} matching games on {}",
            self.budget.attempts(),
            count,
            upstream
        );

        for attempt_no in 1..=self.budget.attempts() {
            let offset = rng.random_range(0..count);
            let attempt = self.attempt(client, filters, offset, is_valid);
            if let Some(detail) = settle(upstream, attempt_no, self.attempt_timeout, attempt).await
            {
                return Ok(SampleOutcome::Found(detail));
            }
        }

        warn!(
            "Could not find a valid game on {} after {} attempts",
            upstream,
            self.budget.attempts()
        );
        Ok(SampleOutcome::ExhaustedRetries {
            attempts: self.budget.attempts(),
        })
    }
}
