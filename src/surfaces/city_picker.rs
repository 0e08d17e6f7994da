//! Departure city picker
//!
//! Drill-down from region to country to city, with a search box that falls
//! back to an AI lookup when the local directory has nothing.

use crate::catalog::{CityDirectory, Country, Region};
use crate::types::Location;

/// What the picker currently lists.
#[derive(Debug, PartialEq)]
pub enum PickerLevel<'a> {
    Regions(&'a [Region]),
    Countries(&'a Region),
    Cities(&'a Country),
    Search {
        local: Vec<Location>,
        ai: Option<&'a Location>,
    },
}

/// Pending AI lookup for a query with no local match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityLookup {
    pub query: String,
}

#[derive(Debug)]
pub struct CityPicker {
    directory: &'static CityDirectory,
    open: bool,
    query: String,
    region: Option<String>,
    country: Option<String>,
    ai_result: Option<Location>,
    searching: bool,
}

impl Default for CityPicker {
    fn default() -> Self {
        Self::new(CityDirectory::global())
    }
}

impl CityPicker {
    pub fn new(directory: &'static CityDirectory) -> Self {
        Self {
            directory,
            open: false,
            query: String::new(),
            region: None,
            country: None,
            ai_result: None,
            searching: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.region = None;
        self.country = None;
        self.ai_result = None;
        self.searching = false;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.ai_result = None;
        self.searching = false;
    }

    pub fn local_results(&self) -> Vec<Location> {
        self.directory.search(&self.query)
    }

    /// More than one character typed and nothing found locally.
    pub fn needs_ai_lookup(&self) -> bool {
        self.query.trim().chars().count() > 1 && self.local_results().is_empty()
    }

    pub fn begin_ai_lookup(&mut self) -> Option<CityLookup> {
        if !self.needs_ai_lookup() {
            return None;
        }
        self.searching = true;
        Some(CityLookup {
            query: self.query.clone(),
        })
    }

    /// Accept a lookup result; answers for a query the user has since
    /// edited are dropped.
    pub fn complete_ai_lookup(&mut self, lookup: CityLookup, result: Option<Location>) -> bool {
        if lookup.query != self.query {
            return false;
        }
        self.searching = false;
        self.ai_result = result;
        true
    }

    pub fn enter_region(&mut self, region_id: &str) -> bool {
        if self.directory.region(region_id).is_none() {
            return false;
        }
        self.region = Some(region_id.to_string());
        self.country = None;
        true
    }

    pub fn enter_country(&mut self, country_id: &str) -> bool {
        let Some(region) = self.region.as_deref() else {
            return false;
        };
        if self.directory.country(region, country_id).is_none() {
            return false;
        }
        self.country = Some(country_id.to_string());
        true
    }

    /// Step back one level: search, then country, then region, then close.
    pub fn back(&mut self) {
        if !self.query.trim().is_empty() {
            self.set_query("");
        } else if self.country.is_some() {
            self.country = None;
        } else if self.region.is_some() {
            self.region = None;
        } else {
            self.close();
        }
    }

    pub fn level(&self) -> PickerLevel<'_> {
        if !self.query.trim().is_empty() {
            return PickerLevel::Search {
                local: self.local_results(),
                ai: self.ai_result.as_ref(),
            };
        }
        let region = self.region.as_deref();
        match (region, self.country.as_deref()) {
            (Some(r), Some(c)) => match self.directory.country(r, c) {
                Some(country) => PickerLevel::Cities(country),
                None => PickerLevel::Regions(self.directory.regions()),
            },
            (Some(r), None) => match self.directory.region(r) {
                Some(region) => PickerLevel::Countries(region),
                None => PickerLevel::Regions(self.directory.regions()),
            },
            _ => PickerLevel::Regions(self.directory.regions()),
        }
    }

    /// Choose a city; the picker closes and resets.
    pub fn select(&mut self, location: Location) -> Location {
        tracing::debug!(city = %location.city, "Departure city selected");
        self.close();
        location
    }
}
