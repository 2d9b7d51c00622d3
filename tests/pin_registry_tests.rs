use blueroad::data::{Augment, Auxiliary, Catalog, EquipmentSelection, Ship};
use blueroad::pins::{PinOutcome, PinRegistry, PinState};
use proptest::prelude::*;

fn catalog() -> Catalog {
    Catalog::from_parts(
        vec![
            Ship::new("Mutsuki", 1688.0, 250.0, 35.0, 125.0),
            Ship::new("Kamikaze", 1764.0, 250.0, 86.0, 125.0),
            Ship::new("Enterprise", 6500.0, 120.0, 75.0, 125.0),
        ],
        vec![
            Auxiliary::new("Repair Toolkit", 500.0, 0.0, 0.0, 0.05),
            Auxiliary::new("550 HP Aux", 550.0, 0.0, 0.0, 0.0),
        ],
        vec![Augment::new("Shield", 200.0, 0.0, 0.0)],
    )
}

fn pin(registry: &mut PinRegistry, catalog: &Catalog, ship: &str, selection: EquipmentSelection) -> PinOutcome {
    let ship = catalog.ship(ship).expect("ship should exist");
    let loadout = catalog.loadout(selection).expect("selection should resolve");
    registry.pin(ship, &loadout).expect("score should succeed")
}

#[test]
fn pin_then_unpin_restores_size_and_membership() {
    let catalog = catalog();
    let mut registry = PinRegistry::default();
    pin(&mut registry, &catalog, "Enterprise", EquipmentSelection::NONE);
    let before = registry.len();

    let selection = EquipmentSelection::new(1, 2, 1);
    pin(&mut registry, &catalog, "Mutsuki", selection);
    assert!(registry.is_pinned("Mutsuki", selection));
    assert_eq!(registry.len(), before + 1);

    assert!(registry.unpin("Mutsuki", selection));
    assert!(!registry.is_pinned("Mutsuki", selection));
    assert_eq!(registry.len(), before);
    assert!(registry.is_pinned("Enterprise", EquipmentSelection::NONE));
}

#[test]
fn unpin_of_absent_entry_is_a_no_op() {
    let mut registry = PinRegistry::default();
    assert!(!registry.unpin("Mutsuki", EquipmentSelection::NONE));
    assert!(registry.is_empty());
}

#[test]
fn two_loadouts_of_one_ship_are_separate_entries() {
    let catalog = catalog();
    let mut registry = PinRegistry::default();
    pin(&mut registry, &catalog, "Mutsuki", EquipmentSelection::NONE);
    pin(&mut registry, &catalog, "Mutsuki", EquipmentSelection::new(2, 1, 0));

    let ranked: Vec<_> = registry.ranked_view().collect();
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|entry| entry.ship == "Mutsuki"));
    assert_eq!(ranked[0].equipment.aux_a, "Repair Toolkit");
    assert_eq!(ranked[1].equipment.aux_a, "None");
}

#[test]
fn toggle_flips_state() {
    let catalog = catalog();
    let ship = catalog.ship("Kamikaze").unwrap();
    let loadout = catalog.loadout(EquipmentSelection::new(1, 0, 0)).unwrap();
    let mut registry = PinRegistry::default();

    assert_eq!(registry.toggle(ship, &loadout).unwrap(), PinState::Pinned);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.toggle(ship, &loadout).unwrap(), PinState::Unpinned);
    assert!(registry.is_empty());
}

#[test]
fn refresh_updates_score_in_place() {
    let catalog = catalog();
    let mut registry = PinRegistry::default();
    pin(&mut registry, &catalog, "Mutsuki", EquipmentSelection::NONE);
    pin(&mut registry, &catalog, "Enterprise", EquipmentSelection::NONE);
    assert_eq!(registry.ranked_view().next().unwrap().ship, "Enterprise");

    assert!(registry.refresh("mutsuki", EquipmentSelection::NONE, 99_999.0));
    let top = registry.ranked_view().next().unwrap();
    assert_eq!(top.ship, "Mutsuki");
    assert_eq!(top.score, 99_999.0);
    assert_eq!(registry.len(), 2);
}

#[test]
fn ranked_view_is_restartable() {
    let catalog = catalog();
    let mut registry = PinRegistry::default();
    pin(&mut registry, &catalog, "Mutsuki", EquipmentSelection::NONE);
    pin(&mut registry, &catalog, "Kamikaze", EquipmentSelection::NONE);

    let first: Vec<_> = registry.ranked_view().map(|e| e.ship.clone()).collect();
    let second: Vec<_> = registry.ranked_view().map(|e| e.ship.clone()).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec!["Kamikaze".to_string(), "Mutsuki".to_string()]);
}

proptest! {
    #[test]
    fn ranked_view_is_descending_and_stable(scores in proptest::collection::vec(0u8..6, 1..18)) {
        let catalog = catalog();
        let mut registry = PinRegistry::default();
        let ship = catalog.ship("Mutsuki").unwrap();
        let mut pinned = Vec::new();
        for (i, _) in scores.iter().enumerate() {
            let selection = EquipmentSelection::new(i % 3, (i / 3) % 3, i / 9);
            let loadout = catalog.loadout(selection).unwrap();
            registry.pin(ship, &loadout).unwrap();
            pinned.push(selection);
        }
        for (selection, score) in pinned.iter().zip(&scores) {
            prop_assert!(registry.refresh("Mutsuki", *selection, f64::from(*score)));
        }

        let ranked: Vec<_> = registry.ranked_view().collect();
        prop_assert_eq!(ranked.len(), scores.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].sequence < pair[1].sequence);
            }
        }
    }
}

fn lettered_catalog(auxiliaries: &[&str]) -> Catalog {
    Catalog::from_parts(
        vec![Ship::new("Mutsuki", 1688.0, 250.0, 35.0, 125.0)],
        auxiliaries
            .iter()
            .map(|name| Auxiliary::new(*name, 100.0, 0.0, 0.0, 0.0))
            .collect(),
        Vec::new(),
    )
}

#[test]
fn rescore_follows_shifted_indices_for_every_pin_of_a_ship() {
    let old = lettered_catalog(&["B Aux", "C Aux"]);
    let mut registry = PinRegistry::default();
    pin(&mut registry, &old, "Mutsuki", EquipmentSelection::new(1, 0, 0));
    pin(&mut registry, &old, "Mutsuki", EquipmentSelection::new(2, 0, 0));

    let reloaded = lettered_catalog(&["A Aux", "B Aux", "C Aux"]);
    let report = registry.rescore(&reloaded);

    assert_eq!(report.refreshed, 2);
    assert!(report.stale.is_empty());
    assert!(registry.is_pinned("Mutsuki", EquipmentSelection::new(2, 0, 0)));
    assert!(registry.is_pinned("Mutsuki", EquipmentSelection::new(3, 0, 0)));
    assert!(!registry.is_pinned("Mutsuki", EquipmentSelection::new(1, 0, 0)));
    for entry in registry.entries() {
        let selection = entry.selection.expect("entry should stay attached");
        let loadout = reloaded.loadout(selection).unwrap();
        assert_eq!(loadout.aux_a.name, entry.equipment.aux_a);
    }

    let ship = reloaded.ship("Mutsuki").unwrap();
    let shifted = reloaded.loadout(EquipmentSelection::new(2, 0, 0)).unwrap();
    assert_eq!(registry.toggle(ship, &shifted).unwrap(), PinState::Unpinned);
    assert_eq!(registry.len(), 1);
}

#[test]
fn rescore_detaches_entries_whose_item_vanished() {
    let old = lettered_catalog(&["B Aux", "C Aux"]);
    let mut registry = PinRegistry::default();
    pin(&mut registry, &old, "Mutsuki", EquipmentSelection::new(1, 0, 0));

    let reloaded = lettered_catalog(&["A Aux", "C Aux"]);
    let report = registry.rescore(&reloaded);

    assert_eq!(report.refreshed, 0);
    assert_eq!(report.stale.len(), 1);
    let entry = &registry.entries()[0];
    assert!(entry.is_detached());
    assert_eq!(entry.equipment.aux_a, "B Aux");
    assert!(!registry.is_pinned("Mutsuki", EquipmentSelection::new(1, 0, 0)));

    let ship = reloaded.ship("Mutsuki").unwrap();
    let a_aux = reloaded.loadout(EquipmentSelection::new(1, 0, 0)).unwrap();
    assert!(matches!(registry.pin(ship, &a_aux).unwrap(), PinOutcome::Pinned { .. }));
    assert_eq!(registry.len(), 2);
}
