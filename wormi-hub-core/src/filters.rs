//! In-memory filtering of the site datasets.

use chrono::{DateTime, Utc};

use crate::{EventRecord, Location, LocationKind, Resource};

/// Event types offered by the listing
pub const EVENT_TYPES: [&str; 3] = ["Workshop", "Pop-up", "Volunteer Shift"];

/// Resource categories offered by the listing
pub const RESOURCE_CATEGORIES: [&str; 5] = ["SOP", "QA/QC", "DIY CFT", "Safety", "Education"];

/// How many upcoming events the front page shows
pub const UPCOMING_LIMIT: usize = 3;

/// A blank search term means "no filter"; otherwise the term is matched as typed.
fn search_term(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.trim().is_empty())
        .map(|t| t.to_lowercase())
}

/// `All` (any case) or nothing selects every value.
fn selection(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        .map(str::to_string)
}

/// Event listing filter: exact type and case-insensitive city substring
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    kind: Option<String>,
    city: Option<String>,
}

impl EventFilter {
    pub fn new(kind: Option<&str>, city: Option<&str>) -> Self {
        Self {
            kind: selection(kind),
            city: search_term(city),
        }
    }

    pub fn matches(&self, event: &EventRecord) -> bool {
        if let Some(ref kind) = self.kind {
            if &event.kind != kind {
                return false;
            }
        }
        if let Some(ref city) = self.city {
            if !event.city.to_lowercase().contains(city.as_str()) {
                return false;
            }
        }
        true
    }

    /// Keep matching events in their given order
    pub fn apply<'a>(&self, events: &'a [EventRecord]) -> Vec<&'a EventRecord> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Events starting strictly after `now`, earliest first, at most `limit`
pub fn upcoming(events: &[EventRecord], now: DateTime<Utc>, limit: usize) -> Vec<&EventRecord> {
    let mut upcoming: Vec<&EventRecord> = events.iter().filter(|e| e.start > now).collect();
    upcoming.sort_by_key(|e| e.start);
    upcoming.truncate(limit);
    upcoming
}

/// Location filter: node kind and a search over name or address
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    kind: Option<LocationKind>,
    search: Option<String>,
}

impl LocationFilter {
    pub fn new(kind: Option<LocationKind>, search: Option<&str>) -> Self {
        Self {
            kind,
            search: search_term(search),
        }
    }

    pub fn matches(&self, location: &Location) -> bool {
        if self.kind.is_some_and(|kind| kind != location.kind) {
            return false;
        }
        match self.search {
            Some(ref term) => {
                location.name.to_lowercase().contains(term.as_str())
                    || location.address.to_lowercase().contains(term.as_str())
            }
            None => true,
        }
    }

    pub fn apply<'a>(&self, locations: &'a [Location]) -> Vec<&'a Location> {
        locations.iter().filter(|l| self.matches(l)).collect()
    }
}

/// Resource filter: exact category and a search over title or summary
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    category: Option<String>,
    search: Option<String>,
}

impl ResourceFilter {
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        Self {
            category: selection(category),
            search: search_term(search),
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(ref category) = self.category {
            if &resource.category != category {
                return false;
            }
        }
        match self.search {
            Some(ref term) => {
                resource.title.to_lowercase().contains(term.as_str())
                    || resource.summary.to_lowercase().contains(term.as_str())
            }
            None => true,
        }
    }

    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        resources.iter().filter(|r| self.matches(r)).collect()
    }
}
