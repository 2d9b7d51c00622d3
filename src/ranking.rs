use rayon::prelude::*;
use serde::Serialize;

use crate::data::catalog::Catalog;
use crate::data::equipment::{EquipmentSelection, LoadoutNames};
use crate::ehp::{ScoreDisplay, ScoreError, Scorer};

#[derive(Debug, Clone, Serialize)]
pub struct RankedShip {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    pub selection: EquipmentSelection,
    pub equipment: LoadoutNames,
    pub ehp: f64,
    pub display: ScoreDisplay,
}

fn score_default(catalog: &Catalog, scorer: &Scorer, index: usize) -> Result<RankedShip, ScoreError> {
    let ship = &catalog.ships()[index];
    let loadout = catalog.default_loadout(ship)?;
    let ehp = scorer.score(ship, &loadout)?;
    Ok(RankedShip {
        name: ship.name.clone(),
        ship_type: ship.ship_type.clone(),
        faction: ship.faction.clone(),
        selection: loadout.selection,
        equipment: loadout.item_names(),
        ehp,
        display: ScoreDisplay::for_score(ehp),
    })
}

/// Score every ship's default loadout in parallel and sort by descending
/// eHP, ties by name. Ships whose score fails are left out.
pub fn rank_by_default_ehp(catalog: &Catalog, scorer: &Scorer) -> Vec<RankedShip> {
    let mut ranked: Vec<RankedShip> = (0..catalog.ships().len())
        .into_par_iter()
        .filter_map(|index| match score_default(catalog, scorer, index) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(ship = %catalog.ships()[index].name, error = %err, "ship left out of ranking");
                None
            }
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .ehp
            .total_cmp(&left.ehp)
            .then_with(|| left.name.cmp(&right.name))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::equipment::{Augment, Auxiliary};
    use crate::data::ship::Ship;

    #[test]
    fn ranking_is_descending_and_skips_failures() {
        let mut broken = Ship::new("Broken", 1000.0, 10.0, 10.0, 125.0);
        broken.dmg_red = vec![1.0];
        let catalog = Catalog::from_parts(
            vec![
                Ship::new("Mutsuki", 1688.0, 250.0, 35.0, 125.0),
                Ship::new("Enterprise", 6500.0, 120.0, 75.0, 125.0),
                broken,
                Ship::new("Kamikaze", 1764.0, 250.0, 86.0, 125.0),
            ],
            vec![Auxiliary::new("Repair Toolkit", 500.0, 0.0, 0.0, 0.05)],
            vec![Augment::new("Tier 3 Augment", 200.0, 15.0, 0.0)],
        );
        let ranked = rank_by_default_ehp(&catalog, &Scorer::default());
        let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Enterprise", "Kamikaze", "Mutsuki"]);
        assert!((ranked[0].ehp - 14258.817488698398).abs() < 1e-6);
        assert_eq!(ranked[0].equipment.aux_a, "None");
    }
}
