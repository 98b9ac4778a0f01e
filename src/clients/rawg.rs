//! RAWG API client, routed through the RapidAPI gateway

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::{MAX_PLATFORM_PAGES, network, non_empty, read_json};
use crate::config::RawgConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::models::{Dimension, FilterSpec, GameDetail, GameSummary, PageQuery, Platform, Position};
use crate::traits::{Addressing, GameCatalogClient, UpstreamConfig};

/// RAWG's maximum `page_size`
pub const PAGE_SIZE: u32 = 40;
/// RAWG refuses pages past this depth, so only 10,000 games are reachable
pub const UPSTREAM_PAGE_CAP: u32 = 250;
const PLATFORM_PAGE_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
struct Listing<T> {
    #[serde(default)]
    count: u64,
    next: Option<String>,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawgSummary {
    id: u64,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawgNamed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawgPlatformEntry {
    platform: RawgNamed,
}

#[derive(Debug, Deserialize)]
struct RawgGame {
    id: u64,
    slug: Option<String>,
    name: Option<String>,
    description_raw: Option<String>,
    background_image: Option<String>,
    released: Option<String>,
    #[serde(default)]
    genres: Option<Vec<RawgNamed>>,
    #[serde(default)]
    platforms: Option<Vec<RawgPlatformEntry>>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawgPlatform {
    id: u32,
    name: String,
    year_start: Option<i32>,
}

/// Client for the RAWG games collection, addressed by page number
pub struct RawgClient {
    client: Client,
    api_key: String,
    api_host: String,
    config: UpstreamConfig,
}

impl RawgClient {
    /// Fails with `ConfigMissing` when the key or the gateway host is absent
    pub fn new(client: Client, settings: &RawgConfig) -> ProxyResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ProxyError::ConfigMissing("RAWG_API_KEY"))?;
        let api_host = settings
            .api_host
            .clone()
            .ok_or(ProxyError::ConfigMissing("RAWG_API_HOST"))?;

        let config = UpstreamConfig {
            name: "RAWG",
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: PAGE_SIZE,
            addressing: Addressing::Paged {
                page_cap: UPSTREAM_PAGE_CAP,
            },
            summary_fields: &["id", "name"],
        };

        Ok(Self {
            client,
            api_key,
            api_host,
            config,
        })
    }

    fn build_url(&self, path: &str, pairs: &[(&str, String)]) -> String {
        if pairs.is_empty() {
            format!("{}/{}", self.config.base_url, path)
        } else {
            format!(
                "{}/{}?{}",
                self.config.base_url,
                path,
                self.encode_pairs(pairs)
            )
        }
    }

    /// RAWG takes one comma-joined parameter per dimension; concepts map to tags
    fn filter_pairs(filters: &FilterSpec) -> Vec<(&'static str, String)> {
        Dimension::ALL
            .into_iter()
            .filter_map(|dimension| {
                let ids = filters.get(dimension)?;
                let key = match dimension {
                    Dimension::Genres => "genres",
                    Dimension::Platforms => "platforms",
                    Dimension::Concepts => "tags",
                };
                Some((key, ids.join(",")))
            })
            .collect()
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ProxyResult<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }
}

fn into_detail(game: RawgGame) -> ProxyResult<GameDetail> {
    let name = non_empty(game.name)
        .ok_or_else(|| ProxyError::UpstreamMalformed(format!("game {} has no name", game.id)))?;

    let site_url = non_empty(game.website).or_else(|| {
        game.slug
            .as_deref()
            .map(|slug| format!("https://rawg.io/games/{slug}"))
    });

    Ok(GameDetail {
        id: game.id.to_string(),
        name,
        description: non_empty(game.description_raw),
        image_url: non_empty(game.background_image),
        released: non_empty(game.released),
        genres: game
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.name)
            .collect(),
        platforms: game
            .platforms
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.platform.name)
            .collect(),
        site_url,
        source: "RAWG",
    })
}

#[async_trait]
impl GameCatalogClient for RawgClient {
    fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    async fn count(&self, filters: &FilterSpec) -> ProxyResult<u64> {
        let mut pairs = vec![("page", "1".to_string()), ("page_size", "1".to_string())];
        pairs.extend(Self::filter_pairs(filters));

        let listing: Listing<RawgSummary> = self.get(&self.build_url("games", &pairs)).await?;
        Ok(listing.count)
    }

    async fn fetch_page(&self, query: &PageQuery<'_>) -> ProxyResult<Vec<GameSummary>> {
        let page = match query.position {
            Position::Page(page) => u64::from(page.max(1)),
            Position::Offset(offset) => offset / u64::from(query.page_size.max(1)) + 1,
        };

        let mut pairs = vec![
            ("page", page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        pairs.extend(Self::filter_pairs(query.filters));

        let listing: Listing<RawgSummary> = self.get(&self.build_url("games", &pairs)).await?;
        Ok(listing
            .results
            .into_iter()
            .map(|s| GameSummary {
                id: s.id.to_string(),
                name: s.name,
            })
            .collect())
    }

    async fn fetch_detail(&self, id: &str) -> ProxyResult<GameDetail> {
        let path = format!("games/{}", urlencoding::encode(id));
        let game: RawgGame = self.get(&self.build_url(&path, &[])).await?;
        into_detail(game)
    }

    async fn fetch_platforms(&self) -> ProxyResult<Vec<Platform>> {
        let mut platforms = Vec::new();

        for page in 1..=MAX_PLATFORM_PAGES {
            let pairs = [
                ("page", page.to_string()),
                ("page_size", PLATFORM_PAGE_SIZE.to_string()),
            ];
            let listing: Listing<RawgPlatform> =
                self.get(&self.build_url("platforms", &pairs)).await?;

            platforms.extend(listing.results.into_iter().map(|p| Platform {
                id: p.id,
                name: p.name,
                release_year: p.year_start,
            }));
            if listing.next.is_none() {
                break;
            }
        }

        info!("Fetched {} platforms from {}", platforms.len(), self.config.name);
        Ok(platforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::parse_body;
    use crate::config::RAWG_BASE_URL;

    fn settings(key: Option<&str>, host: Option<&str>) -> RawgConfig {
        RawgConfig {
            api_key: key.map(str::to_string),
            api_host: host.map(str::to_string),
            base_url: RAWG_BASE_URL.to_string(),
        }
    }

    #[test]
    fn requires_key_and_host() {
        let err = RawgClient::new(Client::new(), &settings(None, Some("h"))).err().unwrap();
        assert!(matches!(err, ProxyError::ConfigMissing("RAWG_API_KEY")));

        let err = RawgClient::new(Client::new(), &settings(Some("k"), None)).err().unwrap();
        assert!(matches!(err, ProxyError::ConfigMissing("RAWG_API_HOST")));
    }

    #[test]
    fn addressing_is_paged_with_cap() {
        let client = RawgClient::new(Client::new(), &settings(Some("k"), Some("h"))).unwrap();
        assert_eq!(
            client.config().addressing,
            Addressing::Paged { page_cap: 250 }
        );
        assert_eq!(client.config().page_size, 40);
    }

    #[test]
    fn builds_filtered_listing_url() {
        let client = RawgClient::new(Client::new(), &settings(Some("k"), Some("h"))).unwrap();
        let filters = FilterSpec::default()
            .with(Dimension::Genres, ["4", "51"])
            .with(Dimension::Concepts, ["31"]);
        let mut pairs = vec![("page", "3".to_string())];
        pairs.extend(RawgClient::filter_pairs(&filters));

        assert_eq!(
            client.build_url("games", &pairs),
            "https://rawg-video-games-database.p.rapidapi.com/games?page=3&genres=4%2C51&tags=31"
        );
    }

    #[test]
    fn parses_listing_count() {
        let body = r#"{"count": 9001, "next": "https://x/games?page=2", "results": [{"id": 3498, "name": "GTA V"}]}"#;
        let listing: Listing<RawgSummary> = parse_body(body).unwrap();
        assert_eq!(listing.count, 9001);
        assert_eq!(listing.results[0].id, 3498);
    }

    #[test]
    fn parses_detail() {
        let body = r#"{
            "id": 3498,
            "slug": "grand-theft-auto-v",
            "name": "Grand Theft Auto V",
            "description_raw": "Rockstar Games went bigger.",
            "background_image": "https://media.rawg.io/gta.jpg",
            "released": "2013-09-17",
            "genres": [{"id": 4, "name": "Action"}],
            "platforms": [{"platform": {"id": 4, "name": "PC"}}],
            "website": ""
        }"#;
        let detail = into_detail(parse_body(body).unwrap()).unwrap();
        assert_eq!(detail.id, "3498");
        assert_eq!(detail.platforms, vec!["PC"]);
        assert_eq!(
            detail.site_url.as_deref(),
            Some("https://rawg.io/games/grand-theft-auto-v")
        );
    }

    #[test]
    fn detail_without_image_still_parses() {
        let body = r#"{"id": 7, "name": "Obscure", "background_image": null}"#;
        let detail = into_detail(parse_body(body).unwrap()).unwrap();
        assert!(detail.image_url.is_none());
        assert!(detail.genres.is_empty());
    }
}
