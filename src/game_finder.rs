use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::catalog::{FilterCatalogProvider, GIANTBOMB_FILTERS, RAWG_FILTERS};
use crate::clients::{GiantBombClient, RawgClient};
use crate::config::Config;
use crate::error::ProxyResult;
use crate::models::{FilterCatalog, FilterOption, FilterSpec, GameDetail, PlatformBuckets, SampleOutcome};
use crate::sampler::sampler_for;
use crate::traits::{GameCatalogClient, Sampler, ValidityPredicate};

/// Giant Bomb games are only worth showing with a description
pub fn has_description(detail: &GameDetail) -> bool {
    detail
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty())
}

/// RAWG games are only worth showing with a name and a cover image
pub fn has_image_and_name(detail: &GameDetail) -> bool {
    !detail.name.trim().is_empty()
        && detail
            .image_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
}

/// Everything needed to serve one upstream: client, sampling strategy,
/// validity rule and curated filters
#[derive(Clone)]
pub struct GameFinder {
    client: Arc<dyn GameCatalogClient>,
    sampler: Arc<dyn Sampler>,
    is_valid: ValidityPredicate,
    catalog: FilterCatalogProvider,
}

impl GameFinder {
    pub fn new(
        client: Arc<dyn GameCatalogClient>,
        sampler: Arc<dyn Sampler>,
        is_valid: ValidityPredicate,
        catalog: FilterCatalogProvider,
    ) -> Self {
        Self {
            client,
            sampler,
            is_valid,
            catalog,
        }
    }

    pub fn giantbomb(http: reqwest::Client, config: &Config) -> ProxyResult<Self> {
        let client = GiantBombClient::new(http, &config.giantbomb)?;
        let sampler = sampler_for(client.config(), config.retry_budget, config.attempt_timeout);

        Ok(Self::new(
            Arc::new(client),
            sampler,
            has_description,
            FilterCatalogProvider::new(&GIANTBOMB_FILTERS),
        ))
    }

    pub fn rawg(http: reqwest::Client, config: &Config) -> ProxyResult<Self> {
        let client = RawgClient::new(http, &config.rawg)?;
        let sampler = sampler_for(client.config(), config.retry_budget, config.attempt_timeout);

        Ok(Self::new(
            Arc::new(client),
            sampler,
            has_image_and_name,
            FilterCatalogProvider::new(&RAWG_FILTERS),
        ))
    }

    pub fn upstream(&self) -> &'static str {
        self.client.config().name
    }

    /// Curated genres and concepts merged with the live platform listing
    pub async fn filters(&self) -> ProxyResult<FilterCatalog> {
        let platforms = self.client.fetch_platforms().await?;
        Ok(self.catalog.catalog(platforms))
    }

    pub fn genres(&self) -> Vec<FilterOption> {
        self.catalog.genres()
    }

    pub async fn platforms(&self) -> ProxyResult<PlatformBuckets> {
        let platforms = self.client.fetch_platforms().await?;
        Ok(self.catalog.partition_platforms(platforms))
    }

    pub async fn random_game(&self, filters: &FilterSpec) -> ProxyResult<SampleOutcome> {
        self.random_game_with(filters, &mut StdRng::from_os_rng()).await
    }

    pub async fn random_game_with(
        &self,
        filters: &FilterSpec,
        rng: &mut StdRng,
    ) -> ProxyResult<SampleOutcome> {
        info!("Picking a random game on {} for {:?}", self.upstream(), filters);
        self.sampler
            .sample(self.client.as_ref(), filters, self.is_valid, rng)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UNKNOWN_YEAR;
    use crate::models::Platform;
    use crate::sampler::tests::{MockCatalog, game};
    use crate::sampler::{DEFAULT_ATTEMPT_TIMEOUT, RetryBudget};
    use crate::traits::Addressing;

    fn finder(mock: MockCatalog, is_valid: ValidityPredicate) -> GameFinder {
        let sampler = sampler_for(&mock.config, RetryBudget::default(), DEFAULT_ATTEMPT_TIMEOUT);
        GameFinder::new(
            Arc::new(mock),
            sampler,
            is_valid,
            FilterCatalogProvider::new(&GIANTBOMB_FILTERS),
        )
    }

    #[test]
    fn description_rule() {
        assert!(has_description(&game("a", true)));
        assert!(!has_description(&game("b", false)));

        let mut blank = game("c", true);
        blank.description = Some("   ".to_string());
        assert!(!has_description(&blank));
    }

    #[test]
    fn image_and_name_rule() {
        let mut detail = game("a", false);
        assert!(!has_image_and_name(&detail));

        detail.image_url = Some("https://media.rawg.io/a.jpg".to_string());
        assert!(has_image_and_name(&detail));

        detail.name = String::new();
        assert!(!has_image_and_name(&detail));
    }

    #[tokio::test]
    async fn found_game_satisfies_the_rule() {
        let mock = MockCatalog::new(Addressing::Offset, 30)
            .with_details(vec![Ok(game("x", false)), Ok(game("y", true))]);
        let finder = finder(mock, has_description);

        let mut rng = StdRng::seed_from_u64(17);
        match finder.random_game_with(&FilterSpec::default(), &mut rng).await.unwrap() {
            SampleOutcome::Found(detail) => assert!(has_description(&detail)),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn filters_use_live_platforms() {
        let mut mock = MockCatalog::new(Addressing::Offset, 0);
        mock.platforms = vec![
            Platform {
                id: 94,
                name: "PC".to_string(),
                release_year: Some(1981),
            },
            Platform {
                id: 36,
                name: "Wii".to_string(),
                release_year: Some(2006),
            },
            Platform {
                id: 999,
                name: "Mystery Box".to_string(),
                release_year: None,
            },
        ];
        let finder = finder(mock, has_description);
        let catalog = finder.filters().await.unwrap();

        assert_eq!(catalog.genres.len(), GIANTBOMB_FILTERS.genres.len());
        assert_eq!(catalog.platforms.primary[0].name, "PC");
        assert_eq!(catalog.platforms.other["2006"][0].name, "Wii");
        assert_eq!(catalog.platforms.other[UNKNOWN_YEAR].len(), 1);
    }
}
