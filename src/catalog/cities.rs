//! Region → country → city directory for the departure picker.

use crate::types::Location;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub id: String,
    pub name: String,
    pub flag: String,
    pub cities: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub countries: Vec<Country>,
}

#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    regions: Vec<Region>,
}

static GLOBAL: LazyLock<CityDirectory> = LazyLock::new(|| {
    CityDirectory::new(vec![
        Region {
            id: "asia-pacific".into(),
            name: "Asia Pacific".into(),
            countries: vec![
                Country {
                    id: "cn".into(),
                    name: "China".into(),
                    flag: "🇨🇳".into(),
                    cities: vec![
                        Location::new("bj", "Beijing", "China", "PEK", "🇨🇳"),
                        Location::new("sh", "Shanghai", "China", "PVG", "🇨🇳"),
                        Location::new("hk", "Hong Kong", "China", "HKG", "🇭🇰"),
                    ],
                },
                Country {
                    id: "jp".into(),
                    name: "Japan".into(),
                    flag: "🇯🇵".into(),
                    cities: vec![Location::new("tyo", "Tokyo", "Japan", "HND", "🇯🇵")],
                },
            ],
        },
        Region {
            id: "europe".into(),
            name: "Europe".into(),
            countries: vec![Country {
                id: "uk-fr".into(),
                name: "UK & France".into(),
                flag: "🇪🇺".into(),
                cities: vec![
                    Location::new("lon", "London", "UK", "LHR", "🇬🇧"),
                    Location::new("par", "Paris", "France", "CDG", "🇫🇷"),
                ],
            }],
        },
    ])
});

impl CityDirectory {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn global() -> &'static CityDirectory {
        &GLOBAL
    }

    /// Default departure city on a fresh start.
    pub fn home_city() -> Location {
        Location::new("bj", "Beijing", "China", "BJS", "🇨🇳")
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn country(&self, region_id: &str, country_id: &str) -> Option<&Country> {
        self.region(region_id)?
            .countries
            .iter()
            .find(|c| c.id == country_id)
    }

    pub fn find_city(&self, id: &str) -> Option<&Location> {
        self.regions
            .iter()
            .flat_map(|r| r.countries.iter())
            .flat_map(|c| c.cities.iter())
            .find(|city| city.id == id)
    }

    /// Case-insensitive match on city, country or airport code.
    pub fn search(&self, query: &str) -> Vec<Location> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.regions
            .iter()
            .flat_map(|r| r.countries.iter())
            .flat_map(|c| c.cities.iter())
            .filter(|city| {
                city.city.to_lowercase().contains(&query)
                    || city.country.to_lowercase().contains(&query)
                    || city.code.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_city_country_and_code() {
        let dir = CityDirectory::global();
        assert_eq!(dir.search("tokyo")[0].code, "HND");
        assert_eq!(dir.search("china").len(), 3);
        assert_eq!(dir.search("cdg")[0].city, "Paris");
        assert!(dir.search("").is_empty());
        assert!(dir.search("reykjavik").is_empty());
    }

    #[test]
    fn test_navigation_lookup() {
        let dir = CityDirectory::global();
        let country = dir.country("europe", "uk-fr").unwrap();
        assert_eq!(country.cities.len(), 2);
        assert!(dir.country("europe", "cn").is_none());
    }

    #[test]
    fn test_find_city_by_id() {
        let dir = CityDirectory::global();
        assert_eq!(dir.find_city("par").unwrap().city, "Paris");
        assert!(dir.find_city("xx").is_none());
    }
}
