//! Startup-loaded catalog of ships and equipment.
//! Load once, share via Arc with handlers and sessions; reload replaces the Arc.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::data::equipment::{
    Augment, Auxiliary, EquipmentSelection, Loadout, DEFAULT_AUGMENTS_FILE,
    DEFAULT_AUXILIARY_FILE, NONE_INDEX,
};
use crate::data::loader::{load_augments, load_auxiliaries, load_ships, normalize_lookup, CatalogError};
use crate::data::ship::{Ship, DEFAULT_SHIPS_FILE};
use crate::ehp::{ConfigurationError, ScoreError, Scorer};

fn index_by_name<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (position, name) in names.enumerate() {
        index.entry(normalize_lookup(name)).or_insert(position);
    }
    index
}

/// Read-only reference data. Equipment lists always start with the "None"
/// item at [`NONE_INDEX`]; everything after it is sorted by name.
#[derive(Debug, Clone)]
pub struct Catalog {
    ships: Vec<Ship>,
    ship_index: HashMap<String, usize>,
    auxiliaries: Vec<Auxiliary>,
    auxiliary_index: HashMap<String, usize>,
    augments: Vec<Augment>,
    augment_index: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn from_parts(
        mut ships: Vec<Ship>,
        mut auxiliaries: Vec<Auxiliary>,
        mut augments: Vec<Augment>,
    ) -> Self {
        ships.sort_by(|a, b| a.name.cmp(&b.name));
        auxiliaries.sort_by(|a, b| a.name.cmp(&b.name));
        augments.sort_by(|a, b| a.name.cmp(&b.name));
        auxiliaries.insert(NONE_INDEX, Auxiliary::none());
        augments.insert(NONE_INDEX, Augment::none());

        let ship_index = index_by_name(ships.iter().map(|s| s.name.as_str()));
        let auxiliary_index = index_by_name(auxiliaries.iter().map(|a| a.name.as_str()));
        let augment_index = index_by_name(augments.iter().map(|a| a.name.as_str()));

        Catalog {
            ships,
            ship_index,
            auxiliaries,
            auxiliary_index,
            augments,
            augment_index,
            loaded_at: Utc::now(),
        }
    }

    /// Load all three catalog files from `data_dir`. The ship file is required.
    pub fn load(data_dir: &Path) -> Result<Self, CatalogError> {
        let ships = load_ships(&data_dir.join(DEFAULT_SHIPS_FILE))?;
        let auxiliaries = load_auxiliaries(&data_dir.join(DEFAULT_AUXILIARY_FILE))?;
        let augments = load_augments(&data_dir.join(DEFAULT_AUGMENTS_FILE))?;
        let catalog = Self::from_parts(ships, auxiliaries, augments);
        tracing::info!(
            data_dir = %data_dir.display(),
            ships = catalog.ships.len(),
            auxiliaries = catalog.auxiliaries.len() - 1,
            augments = catalog.augments.len() - 1,
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Auxiliaries including "None" at index 0.
    pub fn auxiliaries(&self) -> &[Auxiliary] {
        &self.auxiliaries
    }

    /// Augments including "None" at index 0.
    pub fn augments(&self) -> &[Augment] {
        &self.augments
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn ship(&self, name: &str) -> Option<&Ship> {
        self.ship_index
            .get(&normalize_lookup(name))
            .map(|&position| &self.ships[position])
    }

    pub fn require_ship(&self, name: &str) -> Result<&Ship, ConfigurationError> {
        self.ship(name).ok_or_else(|| ConfigurationError::UnknownShip {
            name: name.to_string(),
        })
    }

    pub fn auxiliary_position(&self, name: &str) -> Option<usize> {
        self.auxiliary_index.get(&normalize_lookup(name)).copied()
    }

    pub fn augment_position(&self, name: &str) -> Option<usize> {
        self.augment_index.get(&normalize_lookup(name)).copied()
    }

    pub fn loadout(&self, selection: EquipmentSelection) -> Result<Loadout<'_>, ConfigurationError> {
        let aux = |index: usize| {
            self.auxiliaries
                .get(index)
                .ok_or(ConfigurationError::AuxiliaryOutOfRange {
                    index,
                    len: self.auxiliaries.len(),
                })
        };
        let aux_a = aux(selection.aux_a)?;
        let aux_b = aux(selection.aux_b)?;
        let augment = self.augments.get(selection.augment).ok_or(
            ConfigurationError::AugmentOutOfRange {
                index: selection.augment,
                len: self.augments.len(),
            },
        )?;
        Ok(Loadout {
            selection,
            aux_a,
            aux_b,
            augment,
        })
    }

    /// Resolve item names to a selection. An absent name means the empty slot.
    pub fn selection_by_names(
        &self,
        aux_a: Option<&str>,
        aux_b: Option<&str>,
        augment: Option<&str>,
    ) -> Result<EquipmentSelection, ConfigurationError> {
        let aux = |name: Option<&str>| match name {
            None => Ok(NONE_INDEX),
            Some(name) => self
                .auxiliary_position(name)
                .ok_or_else(|| ConfigurationError::UnknownAuxiliary {
                    name: name.to_string(),
                }),
        };
        let augment = match augment {
            None => NONE_INDEX,
            Some(name) => {
                self.augment_position(name)
                    .ok_or_else(|| ConfigurationError::UnknownAugment {
                        name: name.to_string(),
                    })?
            }
        };
        Ok(EquipmentSelection {
            aux_a: aux(aux_a)?,
            aux_b: aux(aux_b)?,
            augment,
        })
    }

    /// The ship's default loadout. Unknown default names fall back to "None";
    /// `validate` reports them.
    pub fn default_selection(&self, ship: &Ship) -> EquipmentSelection {
        let aux = |name: &Option<String>| {
            name.as_deref()
                .and_then(|n| self.auxiliary_position(n))
                .unwrap_or(NONE_INDEX)
        };
        EquipmentSelection {
            aux_a: aux(&ship.default_eq1),
            aux_b: aux(&ship.default_eq2),
            augment: ship
                .default_aug
                .as_deref()
                .and_then(|n| self.augment_position(n))
                .unwrap_or(NONE_INDEX),
        }
    }

    /// Default equipment names of `ship` that the catalog does not know.
    pub fn unknown_defaults(&self, ship: &Ship) -> Vec<String> {
        let mut unknown = Vec::new();
        for name in [&ship.default_eq1, &ship.default_eq2].into_iter().flatten() {
            if self.auxiliary_position(name).is_none() {
                unknown.push(name.clone());
            }
        }
        if let Some(name) = &ship.default_aug {
            if self.augment_position(name).is_none() {
                unknown.push(name.clone());
            }
        }
        unknown
    }

    pub fn default_loadout(&self, ship: &Ship) -> Result<Loadout<'_>, ConfigurationError> {
        self.loadout(self.default_selection(ship))
    }

    pub fn default_score(&self, ship: &Ship, scorer: &Scorer) -> Result<f64, ScoreError> {
        let loadout = self.default_loadout(ship)?;
        scorer.score(ship, &loadout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_parts(
            vec![
                Ship::new("Mutsuki", 1688.0, 250.0, 35.0, 125.0).with_defaults(
                    Some("Repair Toolkit"),
                    Some("Missing Aux"),
                    Some("Tier 3 Augment"),
                ),
                Ship::new("Enterprise", 6500.0, 120.0, 75.0, 125.0),
            ],
            vec![
                Auxiliary::new("Repair Toolkit", 500.0, 0.0, 0.0, 0.05),
                Auxiliary::new("550 HP Aux", 550.0, 0.0, 0.0, 0.0),
            ],
            vec![Augment::new("Tier 3 Augment", 200.0, 15.0, 0.0)],
        )
    }

    #[test]
    fn none_items_sit_at_index_zero() {
        let catalog = catalog();
        assert_eq!(catalog.auxiliaries()[NONE_INDEX].name, "None");
        assert_eq!(catalog.augments()[NONE_INDEX].name, "None");
        assert_eq!(catalog.auxiliaries()[1].name, "550 HP Aux");
    }

    #[test]
    fn ships_are_sorted_and_looked_up_case_insensitively() {
        let catalog = catalog();
        assert_eq!(catalog.ships()[0].name, "Enterprise");
        assert!(catalog.ship("mutsuki").is_some());
        assert!(matches!(
            catalog.require_ship("Nagato"),
            Err(ConfigurationError::UnknownShip { .. })
        ));
    }

    #[test]
    fn out_of_range_selection_is_a_configuration_error() {
        let err = catalog()
            .loadout(EquipmentSelection::new(0, 9, 0))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::AuxiliaryOutOfRange { index: 9, len: 3 });
    }

    #[test]
    fn default_selection_falls_back_to_none_for_unknown_names() {
        let catalog = catalog();
        let ship = catalog.ship("Mutsuki").unwrap().clone();
        let selection = catalog.default_selection(&ship);
        assert_eq!(selection, EquipmentSelection::new(2, NONE_INDEX, 1));
        assert_eq!(catalog.unknown_defaults(&ship), vec!["Missing Aux".to_string()]);
    }

    #[test]
    fn selection_by_names_rejects_unknown_augment() {
        let err = catalog()
            .selection_by_names(None, None, Some("Mystery"))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownAugment { name: "Mystery".to_string() });
    }
}
