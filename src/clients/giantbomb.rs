//! Giant Bomb API client, called directly with a key in the query string

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::{MAX_PLATFORM_PAGES, network, non_empty, read_json};
use crate::catalog::release_year;
use crate::config::GiantBombConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::models::{FilterSpec, GameDetail, GameSummary, PageQuery, Platform, Position};
use crate::traits::{Addressing, GameCatalogClient, UpstreamConfig};

/// Envelope status for a successful call
const STATUS_OK: i64 = 1;
const PLATFORM_PAGE_SIZE: u32 = 100;
/// Games are sampled one offset at a time
const SAMPLE_WINDOW: u32 = 1;
const DETAIL_FIELDS: &str =
    "guid,name,deck,description,image,original_release_date,genres,platforms,site_detail_url";

/// Every Giant Bomb response is wrapped in this envelope, even errors
#[derive(Debug, Deserialize)]
struct Envelope {
    status_code: i64,
    #[serde(default)]
    error: String,
    #[serde(default)]
    number_of_total_results: u64,
    #[serde(default)]
    results: Value,
}

#[derive(Debug, Deserialize)]
struct GbSummary {
    guid: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GbNamed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GbImage {
    original_url: Option<String>,
    super_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GbGame {
    guid: String,
    name: Option<String>,
    deck: Option<String>,
    description: Option<String>,
    image: Option<GbImage>,
    original_release_date: Option<String>,
    #[serde(default)]
    genres: Option<Vec<GbNamed>>,
    #[serde(default)]
    platforms: Option<Vec<GbNamed>>,
    site_detail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GbPlatform {
    id: u32,
    name: String,
    release_date: Option<String>,
}

/// Client for the Giant Bomb games collection, addressed by offset
pub struct GiantBombClient {
    client: Client,
    api_key: String,
    config: UpstreamConfig,
}

impl GiantBombClient {
    /// Fails with `ConfigMissing` when no API key is configured
    pub fn new(client: Client, settings: &GiantBombConfig) -> ProxyResult<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ProxyError::ConfigMissing("GIANTBOMB_API_KEY"))?;

        let config = UpstreamConfig {
            name: "Giant Bomb",
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: SAMPLE_WINDOW,
            addressing: Addressing::Offset,
            summary_fields: &["guid", "name"],
        };

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Builds `{base}/{resource}/?api_key=..&format=json&...`
    fn build_url(&self, resource: &str, pairs: &[(&str, String)]) -> String {
        let mut all = vec![
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
        ];
        all.extend(pairs.iter().cloned());
        format!(
            "{}/{}/?{}",
            self.config.base_url,
            resource,
            self.encode_pairs(&all)
        )
    }

    /// `filter=genres:1|4,platforms:94`, or nothing for an empty spec
    fn filter_param(filters: &FilterSpec) -> Option<(&'static str, String)> {
        if filters.is_empty() {
            return None;
        }
        let value = filters
            .iter()
            .map(|(dimension, ids)| format!("{}:{}", dimension.as_str(), ids.join("|")))
            .collect::<Vec<_>>()
            .join(",");
        Some(("filter", value))
    }

    async fn get(&self, url: &str) -> ProxyResult<Envelope> {
        debug!("GET {}", url.replace(&self.api_key, "***"));
        let response = self.client.get(url).send().await.map_err(network)?;
        let envelope: Envelope = read_json(response).await?;
        check_envelope(envelope)
    }
}

/// Giant Bomb reports API failures with HTTP 200 and a non-1 status code
fn check_envelope(envelope: Envelope) -> ProxyResult<Envelope> {
    if envelope.status_code == STATUS_OK {
        Ok(envelope)
    } else {
        Err(ProxyError::UpstreamTransport {
            status: u16::try_from(envelope.status_code).unwrap_or(u16::MAX),
            body: envelope.error,
        })
    }
}

fn results<T: DeserializeOwned>(envelope: Envelope) -> ProxyResult<T> {
    serde_json::from_value(envelope.results)
        .map_err(|e| ProxyError::UpstreamMalformed(format!("Giant Bomb results: {e}")))
}

fn into_detail(game: GbGame) -> ProxyResult<GameDetail> {
    let name = non_empty(game.name)
        .ok_or_else(|| ProxyError::UpstreamMalformed(format!("game {} has no name", game.guid)))?;

    Ok(GameDetail {
        id: game.guid,
        name,
        description: non_empty(game.deck).or_else(|| non_empty(game.description)),
        image_url: game
            .image
            .and_then(|img| non_empty(img.original_url).or_else(|| non_empty(img.super_url))),
        released: non_empty(game.original_release_date),
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
            .map(|p| p.name)
            .collect(),
        site_url: non_empty(game.site_detail_url),
        source: "Giant Bomb",
    })
}

fn into_platform(platform: GbPlatform) -> Platform {
    Platform {
        id: platform.id,
        name: platform.name,
        release_year: platform.release_date.as_deref().and_then(release_year),
    }
}

#[async_trait]
impl GameCatalogClient for GiantBombClient {
    fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    async fn count(&self, filters: &FilterSpec) -> ProxyResult<u64> {
        let mut pairs = vec![("limit", "1".to_string()), ("field_list", "guid".to_string())];
        pairs.extend(Self::filter_param(filters));

        let envelope = self.get(&self.build_url("games", &pairs)).await?;
        Ok(envelope.number_of_total_results)
    }

    async fn fetch_page(&self, query: &PageQuery<'_>) -> ProxyResult<Vec<GameSummary>> {
        let offset = match query.position {
            Position::Offset(offset) => offset,
            Position::Page(page) => u64::from(page.saturating_sub(1)) * u64::from(query.page_size),
        };

        let mut pairs = vec![
            ("limit", query.page_size.to_string()),
            ("offset", offset.to_string()),
            ("field_list", query.fields.join(",")),
        ];
        pairs.extend(Self::filter_param(query.filters));

        let envelope = self.get(&self.build_url("games", &pairs)).await?;
        let summaries: Vec<GbSummary> = results(envelope)?;

        Ok(summaries
            .into_iter()
            .map(|s| GameSummary {
                id: s.guid,
                name: s.name,
            })
            .collect())
    }

    async fn fetch_detail(&self, id: &str) -> ProxyResult<GameDetail> {
        let resource = format!("game/{}", urlencoding::encode(id));
        let url = self.build_url(&resource, &[("field_list", DETAIL_FIELDS.to_string())]);

        let envelope = self.get(&url).await?;
        into_detail(results(envelope)?)
    }

    async fn fetch_platforms(&self) -> ProxyResult<Vec<Platform>> {
        let mut platforms = Vec::new();

        for page in 0..MAX_PLATFORM_PAGES {
            let pairs = [
                ("field_list", "id,name,release_date".to_string()),
                ("limit", PLATFORM_PAGE_SIZE.to_string()),
                ("offset", (page * PLATFORM_PAGE_SIZE).to_string()),
            ];
            let envelope = self.get(&self.build_url("platforms", &pairs)).await?;
            let total = envelope.number_of_total_results;
            let batch: Vec<GbPlatform> = results(envelope)?;
            let fetched_all = batch.is_empty();

            platforms.extend(batch.into_iter().map(into_platform));
            if fetched_all || platforms.len() as u64 >= total {
                break;
            }
        }

        info!("Fetched {} platforms from {}", platforms.len(), self.config.name);
        Ok(platforms)
    }
}

/// Parses a raw detail response the way `fetch_detail` does
#[cfg(test)]
fn parse_detail(body: &str) -> ProxyResult<GameDetail> {
    let envelope = check_envelope(super::parse_body(body)?)?;
    into_detail(results(envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GIANTBOMB_BASE_URL;
    use crate::models::Dimension;

    fn client() -> GiantBombClient {
        let settings = GiantBombConfig {
            api_key: Some("k3y".to_string()),
            base_url: format!("{GIANTBOMB_BASE_URL}/"),
        };
        GiantBombClient::new(Client::new(), &settings).unwrap()
    }

    #[test]
    fn requires_api_key() {
        let settings = GiantBombConfig {
            api_key: None,
            base_url: GIANTBOMB_BASE_URL.to_string(),
        };
        let err = GiantBombClient::new(Client::new(), &settings).err().unwrap();
        assert!(matches!(err, ProxyError::ConfigMissing("GIANTBOMB_API_KEY")));
    }

    #[test]
    fn offset_addressing_samples_single_games() {
        let client = client();
        assert_eq!(client.config().addressing, Addressing::Offset);
        assert_eq!(client.config().page_size, 1);
    }

    #[tokio::test]
    async fn network_errors_do_not_leak_the_key() {
        let settings = GiantBombConfig {
            api_key: Some("SECRETKEY123".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
        };
        let client = GiantBombClient::new(Client::new(), &settings).unwrap();

        let err = client.count(&FilterSpec::default()).await.unwrap_err();
        assert!(matches!(err, ProxyError::Network(_)));
        assert!(!format!("{err}").contains("SECRETKEY123"));
        assert!(!format!("{err:?}").contains("SECRETKEY123"));
    }

    #[test]
    fn builds_filtered_listing_url() {
        let client = client();
        let filters = FilterSpec::default()
            .with(Dimension::Genres, ["1", "4"])
            .with(Dimension::Platforms, ["94"]);
        let mut pairs = vec![("limit", "1".to_string())];
        pairs.extend(GiantBombClient::filter_param(&filters));

        assert_eq!(
            client.build_url("games", &pairs),
            "https://www.giantbomb.com/api/games/?api_key=k3y&format=json&limit=1\
             &filter=genres%3A1%7C4%2Cplatforms%3A94"
        );
    }

    #[test]
    fn empty_filters_add_no_parameter() {
        assert!(GiantBombClient::filter_param(&FilterSpec::default()).is_none());
    }

    #[test]
    fn parses_detail_preferring_deck() {
        let body = r#"{
            "status_code": 1,
            "error": "OK",
            "number_of_total_results": 1,
            "results": {
                "guid": "3030-1234",
                "name": "Super Example",
                "deck": "  Jump on things. ",
                "description": "<p>Long form</p>",
                "image": {"original_url": "https://img/1.png", "super_url": null},
                "original_release_date": "2006-11-19",
                "genres": [{"name": "Action"}],
                "platforms": [{"name": "Wii"}, {"name": "PC"}],
                "site_detail_url": "https://www.giantbomb.com/super-example/3030-1234/"
            }
        }"#;

        let detail = parse_detail(body).unwrap();
        assert_eq!(detail.id, "3030-1234");
        assert_eq!(detail.description.as_deref(), Some("Jump on things."));
        assert_eq!(detail.image_url.as_deref(), Some("https://img/1.png"));
        assert_eq!(detail.platforms, vec!["Wii", "PC"]);
        assert_eq!(detail.source, "Giant Bomb");
    }

    #[test]
    fn missing_display_fields_are_not_errors() {
        let body = r#"{"status_code": 1, "results": {"guid": "3030-9", "name": "Bare",
            "deck": null, "description": "", "image": null, "genres": null}}"#;

        let detail = parse_detail(body).unwrap();
        assert!(detail.description.is_none());
        assert!(detail.genres.is_empty());
    }

    #[test]
    fn error_status_in_envelope_is_transport_error() {
        let body = r#"{"status_code": 101, "error": "Object Not Found", "results": []}"#;
        let err = parse_detail(body).unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamTransport { status: 101, .. }));
    }

    #[test]
    fn nameless_game_is_malformed() {
        let body = r#"{"status_code": 1, "results": {"guid": "3030-9", "name": " "}}"#;
        assert!(matches!(parse_detail(body), Err(ProxyError::UpstreamMalformed(_))));
    }

    #[test]
    fn platform_year_comes_from_release_date() {
        let platform = into_platform(GbPlatform {
            id: 36,
            name: "Wii".to_string(),
            release_date: Some("2006-11-19 00:00:00".to_string()),
        });
        assert_eq!(platform.release_year, Some(2006));
    }
}
