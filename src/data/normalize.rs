//! Normalization boundary for raw catalog records.
//!
//! Community dumps and spreadsheets spell fields many ways (`Name`/`name`,
//! `HP`/`hp`, `Nationality`/`faction`, `TYP`/`shipType`, `HPBoost`/`heal`) and
//! encode numbers as strings. Everything is folded into the canonical
//! [`Ship`], [`Auxiliary`] and [`Augment`] shapes here; nothing past this
//! module looks at raw field names.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::data::equipment::{Augment, Auxiliary, NONE_NAME};
use crate::data::ship::{Ship, DEFAULT_LEVEL};

pub const SHIP_COLLECTION_KEYS: &[&str] = &["ships", "Ships"];
pub const AUXILIARY_COLLECTION_KEYS: &[&str] = &["auxiliary", "Auxiliary", "auxiliaries"];
pub const AUGMENT_COLLECTION_KEYS: &[&str] = &["augments", "Augments"];

/// A record dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    })
}

/// Accepts an array, a single number, or a `;`/`|`/`,` separated string.
fn lenient_modifiers<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(number_from_value).collect(),
        Some(Value::Number(n)) => n.as_f64().into_iter().collect(),
        Some(Value::String(s)) => s
            .split(|c| c == ';' || c == '|' || c == ',')
            .filter_map(|part| part.trim().parse::<f64>().ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct RawShipRecord {
    #[serde(default, alias = "Name", alias = "SHIP_NAME", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, alias = "HP", alias = "HEALTH", deserialize_with = "lenient_number")]
    pub hp: Option<f64>,
    #[serde(default, alias = "EVA", alias = "EVASION", deserialize_with = "lenient_number")]
    pub eva: Option<f64>,
    #[serde(default, alias = "LCK", alias = "LUCK", deserialize_with = "lenient_number")]
    pub lck: Option<f64>,
    #[serde(default, alias = "LVL", alias = "LEVEL", deserialize_with = "lenient_number")]
    pub lvl: Option<f64>,
    #[serde(default, alias = "Rarity", alias = "RARITY", deserialize_with = "lenient_string")]
    pub rarity: Option<String>,
    #[serde(
        default,
        alias = "shipType",
        alias = "TYP",
        alias = "typ",
        alias = "Type",
        alias = "type",
        alias = "Hull",
        alias = "SHIP_TYPE",
        deserialize_with = "lenient_string"
    )]
    pub ship_type: Option<String>,
    #[serde(
        default,
        alias = "Faction",
        alias = "FACTION",
        alias = "Nationality",
        alias = "nationality",
        deserialize_with = "lenient_string"
    )]
    pub faction: Option<String>,
    #[serde(default, alias = "ARMOR", alias = "Armor", deserialize_with = "lenient_string")]
    pub armor: Option<String>,
    #[serde(
        default,
        alias = "isRetrofit",
        alias = "Retrofit",
        alias = "retrofit",
        alias = "IS_RETROFIT",
        deserialize_with = "lenient_bool"
    )]
    pub is_retrofit: Option<bool>,
    #[serde(default, alias = "defaultEq1", alias = "DefaultEq1", deserialize_with = "lenient_string")]
    pub default_eq1: Option<String>,
    #[serde(default, alias = "defaultEq2", alias = "DefaultEq2", deserialize_with = "lenient_string")]
    pub default_eq2: Option<String>,
    #[serde(default, alias = "defaultAug", alias = "DefaultAug", deserialize_with = "lenient_string")]
    pub default_aug: Option<String>,
    #[serde(default, alias = "evaBoost", alias = "EVABoost", deserialize_with = "lenient_modifiers")]
    pub eva_boost: Vec<f64>,
    #[serde(default, alias = "evaRate", alias = "EVARate", deserialize_with = "lenient_modifiers")]
    pub eva_rate: Vec<f64>,
    #[serde(default, alias = "dmgRed", alias = "DmgRed", deserialize_with = "lenient_modifiers")]
    pub dmg_red: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAuxiliaryRecord {
    #[serde(default, alias = "Name", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, alias = "HP", deserialize_with = "lenient_number")]
    pub hp: Option<f64>,
    #[serde(default, alias = "EVA", deserialize_with = "lenient_number")]
    pub eva: Option<f64>,
    #[serde(default, alias = "LCK", deserialize_with = "lenient_number")]
    pub lck: Option<f64>,
    #[serde(
        default,
        alias = "HEAL",
        alias = "HPBoost",
        alias = "hpBoost",
        deserialize_with = "lenient_number"
    )]
    pub heal: Option<f64>,
    #[serde(default, alias = "Rarity", deserialize_with = "lenient_string")]
    pub rarity: Option<String>,
    #[serde(default, alias = "Category", deserialize_with = "lenient_string")]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAugmentRecord {
    #[serde(default, alias = "Name", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, alias = "HP", deserialize_with = "lenient_number")]
    pub hp: Option<f64>,
    #[serde(default, alias = "EVA", deserialize_with = "lenient_number")]
    pub eva: Option<f64>,
    #[serde(default, alias = "LCK", deserialize_with = "lenient_number")]
    pub lck: Option<f64>,
    #[serde(default, alias = "Rarity", deserialize_with = "lenient_string")]
    pub rarity: Option<String>,
}

fn is_numeric_name(name: &str) -> bool {
    name.parse::<f64>().is_ok()
}

pub fn normalize_ship(raw: RawShipRecord) -> Result<Ship, String> {
    let name = raw.name.ok_or_else(|| "missing name".to_string())?;
    if is_numeric_name(&name) {
        return Err(format!("numeric name '{name}'"));
    }
    Ok(Ship {
        name,
        hp: raw.hp.unwrap_or(0.0),
        eva: raw.eva.unwrap_or(0.0),
        lck: raw.lck.unwrap_or(0.0),
        lvl: raw.lvl.unwrap_or(DEFAULT_LEVEL),
        rarity: raw.rarity,
        ship_type: raw.ship_type,
        faction: raw.faction,
        armor: raw.armor,
        is_retrofit: raw.is_retrofit.unwrap_or(false),
        default_eq1: raw.default_eq1,
        default_eq2: raw.default_eq2,
        default_aug: raw.default_aug,
        eva_boost: raw.eva_boost,
        eva_rate: raw.eva_rate,
        dmg_red: raw.dmg_red,
    })
}

fn reject_reserved(name: &str) -> Result<(), String> {
    if name.eq_ignore_ascii_case(NONE_NAME) {
        Err(format!("'{name}' is reserved for the empty slot"))
    } else {
        Ok(())
    }
}

pub fn normalize_auxiliary(raw: RawAuxiliaryRecord) -> Result<Auxiliary, String> {
    let name = raw.name.ok_or_else(|| "missing name".to_string())?;
    reject_reserved(&name)?;
    Ok(Auxiliary {
        name,
        hp: raw.hp.unwrap_or(0.0),
        eva: raw.eva.unwrap_or(0.0),
        lck: raw.lck.unwrap_or(0.0),
        heal: raw.heal.unwrap_or(0.0),
        rarity: raw.rarity,
        category: raw.category,
    })
}

pub fn normalize_augment(raw: RawAugmentRecord) -> Result<Augment, String> {
    let name = raw.name.ok_or_else(|| "missing name".to_string())?;
    reject_reserved(&name)?;
    Ok(Augment {
        name,
        hp: raw.hp.unwrap_or(0.0),
        eva: raw.eva.unwrap_or(0.0),
        lck: raw.lck.unwrap_or(0.0),
        rarity: raw.rarity,
    })
}

/// Pull the record list out of a top-level document: a bare array, an object
/// holding the array under one of `keys`, or an object map of records.
pub fn records_from_value(value: Value, keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in keys {
                if let Some(Value::Array(_)) = map.get(*key) {
                    if let Some(Value::Array(items)) = map.remove(*key) {
                        return items;
                    }
                }
            }
            map.into_iter()
                .map(|(_, v)| v)
                .filter(Value::is_object)
                .collect()
        }
        _ => Vec::new(),
    }
}

fn normalize_with<R, T>(records: Vec<Value>, convert: impl Fn(R) -> Result<T, String>) -> Normalized<T>
where
    R: DeserializeOwned,
{
    let mut out = Normalized {
        records: Vec::with_capacity(records.len()),
        skipped: Vec::new(),
    };
    for (index, record) in records.into_iter().enumerate() {
        let converted = serde_json::from_value::<R>(record)
            .map_err(|err| err.to_string())
            .and_then(&convert);
        match converted {
            Ok(item) => out.records.push(item),
            Err(reason) => {
                tracing::debug!(index, %reason, "skipping catalog record");
                out.skipped.push(SkippedRecord { index, reason });
            }
        }
    }
    out
}

pub fn normalize_ships(document: Value) -> Normalized<Ship> {
    normalize_with(records_from_value(document, SHIP_COLLECTION_KEYS), normalize_ship)
}

pub fn normalize_auxiliaries(document: Value) -> Normalized<Auxiliary> {
    normalize_with(
        records_from_value(document, AUXILIARY_COLLECTION_KEYS),
        normalize_auxiliary,
    )
}

pub fn normalize_augments(document: Value) -> Normalized<Augment> {
    normalize_with(
        records_from_value(document, AUGMENT_COLLECTION_KEYS),
        normalize_augment,
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn legacy_dump_fields_map_to_canonical_ship() {
        let doc = json!({ "Ships": [{
            "Name": "Mutsuki",
            "HP": "1688",
            "EVA": 250,
            "LCK": 35,
            "LVL": 125,
            "Nationality": "Sakura Empire",
            "TYP": "DD",
            "DefaultEq1": "Repair Toolkit",
            "DmgRed": [0.1, 0.3, 0.2],
            "EVABoost": 0.1
        }]});
        let out = normalize_ships(doc);
        assert!(out.skipped.is_empty());
        let ship = &out.records[0];
        assert_eq!(ship.name, "Mutsuki");
        assert_eq!(ship.hp, 1688.0);
        assert_eq!(ship.faction.as_deref(), Some("Sakura Empire"));
        assert_eq!(ship.ship_type.as_deref(), Some("DD"));
        assert_eq!(ship.default_eq1.as_deref(), Some("Repair Toolkit"));
        assert_eq!(ship.dmg_red, vec![0.1, 0.3, 0.2]);
        assert_eq!(ship.eva_boost, vec![0.1]);
    }

    #[test]
    fn numeric_and_missing_names_are_skipped() {
        let out = normalize_ships(json!([{ "Name": "22", "HP": 1 }, { "HP": 5 }, { "name": "Ok", "hp": 1 }]));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.skipped.len(), 2);
        assert_eq!(out.skipped[0].index, 0);
    }

    #[test]
    fn auxiliary_heal_accepts_hp_boost_alias() {
        let out = normalize_auxiliaries(json!({
            "a": { "Name": "Repair Toolkit", "HP": 500, "HPBoost": 0.05 }
        }));
        assert_eq!(out.records[0].heal, 0.05);
    }

    #[test]
    fn reserved_none_name_is_rejected() {
        let out = normalize_augments(json!([{ "name": "none" }]));
        assert!(out.records.is_empty());
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn modifier_string_splits_on_separators() {
        let out = normalize_ships(json!([{ "name": "A", "evaRate": "0.1;0.2|0.3" }]));
        assert_eq!(out.records[0].eva_rate, vec![0.1, 0.2, 0.3]);
    }
}
