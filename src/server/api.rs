use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::data::catalog::Catalog;
use crate::data::equipment::{
    Augment, Auxiliary, EquipmentSelection, LoadoutNames, NONE_INDEX,
};
use crate::data::loader::CatalogError;
use crate::data::query::{ShipQuery, MAX_PAGE_SIZE};
use crate::data::ship::Ship;
use crate::ehp::{
    AggregatedStats, ConfigurationError, FormulaVariant, HealStacking, InvalidInputError,
    ScoreDisplay, ScoreError, Scorer,
};
use crate::fleet::{Fleet, FleetScore, FleetSlot};
use crate::pins::{PinOutcome, PinState, PinnedEntry};
use crate::ranking::{rank_by_default_ehp, RankedShip};
use crate::server::AppState;

const DEFAULT_RANKING_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationErrorResponse {
    fn new(errors: Vec<ValidationIssue>) -> Self {
        Self {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }

    fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue {
            field: field.into(),
            messages: vec![message.into()],
        }])
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid query string: {0}")]
    Query(String),

    #[error("Invalid path segment {0}")]
    Path(String),

    #[error("Validation failed")]
    Validation(ValidationErrorResponse),

    #[error("Unknown session '{0}'")]
    UnknownSession(String),

    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl From<ScoreError> for ApiError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::Configuration(err) => Self::Configuration(err),
            ScoreError::InvalidInput(err) => Self::InvalidInput(err),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Parse(_) | Self::Query(_) | Self::Path(_) | Self::Validation(_) => {
                (400, "Bad Request")
            }
            Self::Configuration(ConfigurationError::UnknownShip { .. }) | Self::UnknownSession(_) => {
                (404, "Not Found")
            }
            Self::Configuration(_) => (400, "Bad Request"),
            Self::InvalidInput(_) => (422, "Unprocessable Entity"),
            Self::Catalog(_) | Self::Serialize(_) => (500, "Internal Server Error"),
        }
    }
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Serialize)
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::Parse)
}

/// An equipment slot given either by catalog index or by item name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigurationRequest {
    pub ship: String,
    #[serde(default)]
    pub aux_a: Option<ItemRef>,
    #[serde(default)]
    pub aux_b: Option<ItemRef>,
    #[serde(default)]
    pub augment: Option<ItemRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EhpRequest {
    #[serde(flatten)]
    pub configuration: ConfigurationRequest,
    #[serde(default)]
    pub formula: Option<FormulaVariant>,
    #[serde(default)]
    pub heal_stacking: Option<HealStacking>,
}

impl ConfigurationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.ship.trim().is_empty() {
            return Err(ApiError::Validation(ValidationErrorResponse::single(
                "ship",
                "ship is required",
            )));
        }
        Ok(())
    }

    fn selection(&self, catalog: &Catalog) -> Result<EquipmentSelection, ConfigurationError> {
        let aux = |item: &Option<ItemRef>| match item {
            None => Ok(NONE_INDEX),
            Some(ItemRef::Index(index)) => Ok(*index),
            Some(ItemRef::Name(name)) => catalog.auxiliary_position(name).ok_or_else(|| {
                ConfigurationError::UnknownAuxiliary { name: name.clone() }
            }),
        };
        let augment = match &self.augment {
            None => NONE_INDEX,
            Some(ItemRef::Index(index)) => *index,
            Some(ItemRef::Name(name)) => catalog.augment_position(name).ok_or_else(|| {
                ConfigurationError::UnknownAugment { name: name.clone() }
            })?,
        };
        Ok(EquipmentSelection {
            aux_a: aux(&self.aux_a)?,
            aux_b: aux(&self.aux_b)?,
            augment,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
}

impl EquipmentQuery {
    fn matches(filter: &Option<String>, value: &Option<String>) -> bool {
        match filter.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            None => true,
            Some(wanted) => value
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(wanted)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipSummary<'a> {
    #[serde(flatten)]
    pub ship: &'a Ship,
    pub default_equipment: Option<LoadoutNames>,
    pub default_ehp: Option<f64>,
    pub display: Option<ScoreDisplay>,
}

fn summarize<'a>(catalog: &'a Catalog, ship: &'a Ship, scorer: &Scorer) -> ShipSummary<'a> {
    let default_equipment = catalog.default_loadout(ship).ok().map(|l| l.item_names());
    let default_ehp = match catalog.default_score(ship, scorer) {
        Ok(score) => Some(score),
        Err(err) => {
            tracing::debug!(ship = %ship.name, error = %err, "default loadout not scorable");
            None
        }
    };
    ShipSummary {
        ship,
        default_equipment,
        default_ehp,
        display: default_ehp.map(ScoreDisplay::for_score),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipListResponse<'a> {
    pub ships: Vec<ShipSummary<'a>>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexedItem<'a, T> {
    pub index: usize,
    #[serde(flatten)]
    pub item: &'a T,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub status: &'static str,
    pub ship: String,
    pub selection: EquipmentSelection,
    pub equipment: LoadoutNames,
    pub stats: AggregatedStats,
    pub ehp: f64,
    pub display: ScoreDisplay,
    pub formula: FormulaVariant,
    pub heal_stacking: HealStacking,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedPin<'a> {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: &'a PinnedEntry,
    pub display: ScoreDisplay,
}

pub fn health_payload(state: &AppState) -> Result<String, ApiError> {
    let catalog = state.catalog();
    let scorer = state.scorer();
    to_pretty(&serde_json::json!({
        "status": "ok",
        "service": "blueroad-api",
        "version": env!("CARGO_PKG_VERSION"),
        "ships": catalog.ships().len(),
        "auxiliaries": catalog.auxiliaries().len() - 1,
        "augments": catalog.augments().len() - 1,
        "catalog_loaded_at": catalog.loaded_at().to_rfc3339(),
        "sessions": state.sessions().len(),
        "formula": scorer.variant.as_str(),
        "heal_stacking": scorer.heal_stacking.as_str(),
    }))
}

fn validate_ship_query(query: &ShipQuery) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if query.page == Some(0) {
        errors.push(ValidationIssue {
            field: "page".to_string(),
            messages: vec!["page must be at least 1".to_string()],
        });
    }
    if let Some(limit) = query.limit {
        if limit == 0 || limit > MAX_PAGE_SIZE {
            errors.push(ValidationIssue {
                field: "limit".to_string(),
                messages: vec![format!("limit must be between 1 and {MAX_PAGE_SIZE}")],
            });
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(ValidationErrorResponse::new(errors)))
    }
}

pub fn ships_payload(state: &AppState, query: &ShipQuery) -> Result<String, ApiError> {
    validate_ship_query(query)?;
    let catalog = state.catalog();
    let scorer = state.scorer();
    let page = query.apply(catalog.ships(), state.page_size());
    to_pretty(&ShipListResponse {
        ships: page
            .ships
            .into_iter()
            .map(|ship| summarize(&catalog, ship, &scorer))
            .collect(),
        total: page.total,
        total_pages: page.total_pages,
        current_page: page.current_page,
    })
}

pub fn ship_payload(state: &AppState, name: &str) -> Result<String, ApiError> {
    let catalog = state.catalog();
    let ship = catalog.require_ship(name)?;
    let summary = summarize(&catalog, ship, &state.scorer());
    to_pretty(&serde_json::json!({
        "status": "ok",
        "ship": summary,
        "default_selection": catalog.default_selection(ship),
    }))
}

pub fn auxiliary_payload(state: &AppState, query: &EquipmentQuery) -> Result<String, ApiError> {
    let catalog = state.catalog();
    let items: Vec<IndexedItem<'_, Auxiliary>> = catalog
        .auxiliaries()
        .iter()
        .enumerate()
        .filter(|(index, aux)| {
            *index == NONE_INDEX
                || (EquipmentQuery::matches(&query.category, &aux.category)
                    && EquipmentQuery::matches(&query.rarity, &aux.rarity))
        })
        .map(|(index, item)| IndexedItem { index, item })
        .collect();
    to_pretty(&items)
}

pub fn augments_payload(state: &AppState, query: &EquipmentQuery) -> Result<String, ApiError> {
    let catalog = state.catalog();
    let items: Vec<IndexedItem<'_, Augment>> = catalog
        .augments()
        .iter()
        .enumerate()
        .filter(|(index, aug)| {
            *index == NONE_INDEX || EquipmentQuery::matches(&query.rarity, &aug.rarity)
        })
        .map(|(index, item)| IndexedItem { index, item })
        .collect();
    to_pretty(&items)
}

pub fn rankings_payload(state: &AppState, query: &RankingQuery) -> Result<String, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    if limit == 0 {
        return Err(ApiError::Validation(ValidationErrorResponse::single(
            "limit",
            "limit must be at least 1",
        )));
    }
    let catalog = state.catalog();
    let mut ranked: Vec<RankedShip> = rank_by_default_ehp(&catalog, &state.scorer());
    let total = ranked.len();
    ranked.truncate(limit);
    to_pretty(&serde_json::json!({
        "status": "ok",
        "total": total,
        "rankings": ranked,
    }))
}

pub fn ehp_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let request: EhpRequest = parse_body(body)?;
    request.configuration.validate()?;
    let base = state.scorer();
    let scorer = Scorer::new(
        request.formula.unwrap_or(base.variant),
        request.heal_stacking.unwrap_or(base.heal_stacking),
    );

    let catalog = state.catalog();
    let ship = catalog.require_ship(&request.configuration.ship)?;
    let loadout = catalog.loadout(request.configuration.selection(&catalog)?)?;
    let stats = scorer.stats(ship, &loadout);
    let ehp = scorer.score_stats(&stats)?;

    to_pretty(&ScoreResponse {
        status: "ok",
        ship: ship.name.clone(),
        selection: loadout.selection,
        equipment: loadout.item_names(),
        stats,
        ehp,
        display: ScoreDisplay::for_score(ehp),
        formula: scorer.variant,
        heal_stacking: scorer.heal_stacking,
    })
}

/// Body is an object of slot name to ship name (`null` leaves a slot empty).
pub fn fleet_payload(state: &AppState, body: &str) -> Result<String, ApiError> {
    let request: BTreeMap<String, Option<String>> = parse_body(body)?;
    let mut fleet = Fleet::new();
    let mut errors = Vec::new();
    for (slot_name, ship) in request {
        match slot_name.parse::<FleetSlot>() {
            Ok(slot) => {
                if let Some(ship) = ship.filter(|s| !s.trim().is_empty()) {
                    fleet.assign(slot, ship);
                }
            }
            Err(message) => errors.push(ValidationIssue {
                field: slot_name,
                messages: vec![message],
            }),
        }
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(ValidationErrorResponse::new(errors)));
    }

    let catalog = state.catalog();
    let score: FleetScore = fleet.score(&catalog, &state.scorer())?;
    to_pretty(&serde_json::json!({
        "status": "ok",
        "slots": score.slots,
        "total": score.total,
    }))
}

fn session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::UnknownSession(raw.to_string()))
}

pub fn create_session_payload(state: &AppState) -> Result<String, ApiError> {
    let id = state.sessions().create(state.scorer());
    to_pretty(&serde_json::json!({ "status": "ok", "session_id": id }))
}

pub fn delete_session_payload(state: &AppState, raw_id: &str) -> Result<String, ApiError> {
    let id = session_id(raw_id)?;
    if !state.sessions().remove(&id) {
        return Err(ApiError::UnknownSession(raw_id.to_string()));
    }
    to_pretty(&serde_json::json!({ "status": "ok", "session_id": id }))
}

pub fn pins_payload(state: &AppState, raw_id: &str) -> Result<String, ApiError> {
    let id = session_id(raw_id)?;
    state
        .sessions()
        .with_session(&id, |registry| {
            let pins: Vec<RankedPin<'_>> = registry
                .ranked_view()
                .enumerate()
                .map(|(position, entry)| RankedPin {
                    rank: position + 1,
                    entry,
                    display: ScoreDisplay::for_score(entry.score),
                })
                .collect();
            to_pretty(&serde_json::json!({
                "status": "ok",
                "session_id": id,
                "count": pins.len(),
                "pins": pins,
            }))
        })
        .ok_or_else(|| ApiError::UnknownSession(raw_id.to_string()))?
}

fn unknown_session(raw_id: &str) -> ApiError {
    ApiError::UnknownSession(raw_id.to_string())
}

// Selections are catalog indices, so they are resolved inside the session
// lock against the catalog the registry was last rescored with.

pub fn pin_payload(state: &AppState, raw_id: &str, body: &str) -> Result<String, ApiError> {
    let id = session_id(raw_id)?;
    let request: ConfigurationRequest = parse_body(body)?;
    request.validate()?;

    let (ship, selection, outcome, count) = state
        .sessions()
        .with_session(&id, |registry| -> Result<_, ApiError> {
            let catalog = state.catalog();
            let ship = catalog.require_ship(&request.ship)?;
            let loadout = catalog.loadout(request.selection(&catalog)?)?;
            let outcome: PinOutcome = registry.pin(ship, &loadout)?;
            Ok((ship.name.clone(), loadout.selection, outcome, registry.len()))
        })
        .ok_or_else(|| unknown_session(raw_id))??;

    to_pretty(&serde_json::json!({
        "status": "ok",
        "result": outcome,
        "ship": ship,
        "selection": selection,
        "count": count,
    }))
}

pub fn toggle_payload(state: &AppState, raw_id: &str, body: &str) -> Result<String, ApiError> {
    let id = session_id(raw_id)?;
    let request: ConfigurationRequest = parse_body(body)?;
    request.validate()?;

    let (ship, selection, pin_state, count) = state
        .sessions()
        .with_session(&id, |registry| -> Result<_, ApiError> {
            let catalog = state.catalog();
            let ship = catalog.require_ship(&request.ship)?;
            let loadout = catalog.loadout(request.selection(&catalog)?)?;
            let pin_state: PinState = registry.toggle(ship, &loadout)?;
            Ok((ship.name.clone(), loadout.selection, pin_state, registry.len()))
        })
        .ok_or_else(|| unknown_session(raw_id))??;

    to_pretty(&serde_json::json!({
        "status": "ok",
        "state": pin_state,
        "ship": ship,
        "selection": selection,
        "count": count,
    }))
}

pub fn unpin_payload(state: &AppState, raw_id: &str, body: &str) -> Result<String, ApiError> {
    let id = session_id(raw_id)?;
    let request: ConfigurationRequest = parse_body(body)?;
    request.validate()?;

    let (removed, count) = state
        .sessions()
        .with_session(&id, |registry| -> Result<_, ApiError> {
            let catalog = state.catalog();
            let selection = request.selection(&catalog)?;
            Ok((registry.unpin(&request.ship, selection), registry.len()))
        })
        .ok_or_else(|| unknown_session(raw_id))??;

    to_pretty(&serde_json::json!({
        "status": "ok",
        "removed": removed,
        "count": count,
    }))
}

/// Remove the session's detached pins.
pub fn prune_payload(state: &AppState, raw_id: &str) -> Result<String, ApiError> {
    let id = session_id(raw_id)?;
    let (removed, count) = state
        .sessions()
        .with_session(&id, |registry| (registry.prune_detached(), registry.len()))
        .ok_or_else(|| unknown_session(raw_id))?;

    to_pretty(&serde_json::json!({
        "status": "ok",
        "removed": removed,
        "count": count,
    }))
}

/// Reload the catalog files and rescore every session's pins.
pub fn reload_catalog_payload(state: &AppState) -> Result<String, ApiError> {
    let catalog = Catalog::load(state.data_dir())?;
    let (catalog, reports) = state
        .sessions()
        .rescore_all(|| state.replace_catalog(catalog));
    let refreshed: usize = reports.iter().map(|(_, report)| report.refreshed).sum();
    let stale: usize = reports.iter().map(|(_, report)| report.stale.len()).sum();
    tracing::info!(sessions = reports.len(), refreshed, stale, "catalog reloaded");

    to_pretty(&serde_json::json!({
        "status": "ok",
        "ships": catalog.ships().len(),
        "auxiliaries": catalog.auxiliaries().len() - 1,
        "augments": catalog.augments().len() - 1,
        "sessions": reports.len(),
        "refreshed": refreshed,
        "stale": stale,
    }))
}
