//! Ship listing: filters plus page/limit pagination over the sorted catalog.

use serde::{Deserialize, Serialize};

use crate::data::ship::Ship;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipQuery {
    #[serde(default, alias = "shipType")]
    pub ship_type: Option<String>,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    /// Case-insensitive substring of the ship name.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipPage<'a> {
    pub ships: Vec<&'a Ship>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn field_matches(filter: Option<&str>, field: &Option<String>) -> bool {
    match filter {
        None => true,
        Some(wanted) => field
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case(wanted)),
    }
}

impl ShipQuery {
    pub fn matches(&self, ship: &Ship) -> bool {
        let search_ok = match non_empty(&self.search) {
            None => true,
            Some(needle) => ship.name.to_lowercase().contains(&needle.to_lowercase()),
        };
        search_ok
            && field_matches(non_empty(&self.ship_type), &ship.ship_type)
            && field_matches(non_empty(&self.faction), &ship.faction)
            && field_matches(non_empty(&self.rarity), &ship.rarity)
    }

    /// Filter `ships` (already sorted) and cut out the requested page.
    /// Callers validate `page >= 1` and `1 <= limit <= MAX_PAGE_SIZE` first.
    pub fn apply<'a>(&self, ships: &'a [Ship], default_limit: usize) -> ShipPage<'a> {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);

        let matching: Vec<&Ship> = ships.iter().filter(|ship| self.matches(ship)).collect();
        let total = matching.len();
        let total_pages = total.div_ceil(limit);
        let ships = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        ShipPage {
            ships,
            total,
            total_pages,
            current_page: page,
        }
    }
}
