//! Filter catalog: curated genre/concept lists plus a live platform listing
//! split into well-known platforms and everything else grouped by year.

mod curated;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{FilterCatalog, FilterOption, Platform, PlatformBuckets};

pub use curated::{GIANTBOMB_FILTERS, RAWG_FILTERS};

/// Bucket for platforms without a known release year
pub const UNKNOWN_YEAR: &str = "unknown";

/// Static filter tables for one upstream
#[derive(Debug)]
pub struct CuratedFilters {
    pub genres: &'static [FilterOption],
    pub concepts: &'static [FilterOption],
    /// Platforms listed first, in this order
    pub primary_platform_ids: &'static [u32],
}

#[derive(Debug, Clone, Copy)]
pub struct FilterCatalogProvider {
    tables: &'static CuratedFilters,
}

impl FilterCatalogProvider {
    pub fn new(tables: &'static CuratedFilters) -> Self {
        Self { tables }
    }

    pub fn genres(&self) -> Vec<FilterOption> {
        self.tables.genres.to_vec()
    }

    pub fn concepts(&self) -> Vec<FilterOption> {
        self.tables.concepts.to_vec()
    }

    pub fn partition_platforms(&self, platforms: Vec<Platform>) -> PlatformBuckets {
        let allow_list = self.tables.primary_platform_ids;
        let mut primary = Vec::new();
        let mut other: BTreeMap<String, Vec<Platform>> = BTreeMap::new();

        for platform in platforms {
            if allow_list.contains(&platform.id) {
                primary.push(platform);
            } else {
                let year = platform
                    .release_year
                    .map_or_else(|| UNKNOWN_YEAR.to_string(), |y| y.to_string());
                other.entry(year).or_default().push(platform);
            }
        }

        primary.sort_by_key(|p| allow_list.iter().position(|id| *id == p.id));
        primary.dedup_by_key(|p| p.id);
        for bucket in other.values_mut() {
            bucket.sort_by(|a, b| a.name.cmp(&b.name));
        }

        PlatformBuckets { primary, other }
    }

    pub fn catalog(&self, platforms: Vec<Platform>) -> FilterCatalog {
        FilterCatalog {
            genres: self.genres(),
            concepts: self.concepts(),
            platforms: self.partition_platforms(platforms),
        }
    }
}

/// Year of a `YYYY-MM-DD` date, with or without a trailing time part
pub fn release_year(date: &str) -> Option<i32> {
    let day = date.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLES: CuratedFilters = CuratedFilters {
        genres: &[FilterOption {
            id: 1,
            name: "Action",
        }],
        concepts: &[],
        primary_platform_ids: &[94, 146],
    };

    fn platform(id: u32, name: &str, date: Option<&str>) -> Platform {
        Platform {
            id,
            name: name.to_string(),
            release_year: date.and_then(release_year),
        }
    }

    #[test]
    fn non_primary_platform_goes_to_its_year() {
        let provider = FilterCatalogProvider::new(&TABLES);
        let buckets = provider.partition_platforms(vec![platform(36, "Wii", Some("2006-11-17"))]);

        assert!(buckets.primary.is_empty());
        assert_eq!(buckets.other["2006"][0].name, "Wii");
    }

    #[test]
    fn primary_platforms_follow_allow_list_order() {
        let provider = FilterCatalogProvider::new(&TABLES);
        let buckets = provider.partition_platforms(vec![
            platform(146, "PlayStation 4", Some("2013-11-15")),
            platform(94, "PC", Some("1981-08-12")),
            platform(20, "Xbox 360", Some("2005-11-22")),
        ]);

        let ids: Vec<_> = buckets.primary.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![94, 146]);
        assert_eq!(buckets.other.len(), 1);
        assert!(buckets.other.contains_key("2005"));
    }

    #[test]
    fn undated_platforms_are_grouped_as_unknown() {
        let provider = FilterCatalogProvider::new(&TABLES);
        let buckets = provider.partition_platforms(vec![
            platform(900, "Zeebo", None),
            platform(901, "Arcade", Some("not a date")),
        ]);

        let names: Vec<_> = buckets.other[UNKNOWN_YEAR]
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Arcade", "Zeebo"]);
    }

    #[test]
    fn catalog_merges_static_and_live_data() {
        let catalog = FilterCatalogProvider::new(&TABLES).catalog(Vec::new());
        assert_eq!(catalog.genres.len(), 1);
        assert!(catalog.concepts.is_empty());
        assert_eq!(catalog.platforms, PlatformBuckets::default());
    }

    #[test]
    fn parses_release_years() {
        assert_eq!(release_year("2006-11-17"), Some(2006));
        assert_eq!(release_year("2006-11-17 00:00:00"), Some(2006));
        assert_eq!(release_year("2006"), None);
        assert_eq!(release_year(""), None);
    }

    #[test]
    fn curated_tables_have_unique_ids() {
        for tables in [&GIANTBOMB_FILTERS, &RAWG_FILTERS] {
            for list in [tables.genres, tables.concepts] {
                let mut ids: Vec<_> = list.iter().map(|o| o.id).collect();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), list.len());
            }
        }
    }
}
