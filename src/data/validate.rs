use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::data::catalog::Catalog;
use crate::data::loader::normalize_lookup;
use crate::data::ship::{Ship, MAX_LEVEL};
use crate::ehp::Scorer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Check the loaded catalog for data that would make scores meaningless or
/// fail outright. Every ship's default loadout is scored with `scorer`.
pub fn validate_catalog(catalog: &Catalog, scorer: &Scorer) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen = HashSet::new();
    for ship in catalog.ships() {
        let context = format!("ship '{}'", ship.name);
        if !seen.insert(normalize_lookup(&ship.name)) {
            report.push(ValidationSeverity::Error, context.clone(), "duplicate ship name");
        }
        validate_ship_stats(&mut report, &context, ship);

        for name in catalog.unknown_defaults(ship) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                format!("default equipment '{name}' is not in the catalog; using None"),
            );
        }

        if let Err(err) = catalog.default_score(ship, scorer) {
            report.push(
                ValidationSeverity::Error,
                context,
                format!("default loadout cannot be scored: {err}"),
            );
        }
    }

    check_duplicates(
        &mut report,
        "auxiliary",
        catalog.auxiliaries().iter().map(|a| a.name.as_str()),
    );
    check_duplicates(
        &mut report,
        "augment",
        catalog.augments().iter().map(|a| a.name.as_str()),
    );

    for aux in catalog.auxiliaries() {
        if aux.heal < 0.0 || aux.hp < 0.0 {
            report.push(
                ValidationSeverity::Warning,
                format!("auxiliary '{}'", aux.name),
                "negative hp or heal bonus",
            );
        }
    }

    if catalog.ships().is_empty() {
        report.push(ValidationSeverity::Warning, "catalog", "no ships loaded");
    }

    report
}

fn validate_ship_stats(report: &mut ValidationReport, context: &str, ship: &Ship) {
    if ship.hp <= 0.0 {
        report.push(ValidationSeverity::Error, context, format!("hp must be positive, got {}", ship.hp));
    }
    if ship.eva < 0.0 || ship.lck < 0.0 {
        report.push(ValidationSeverity::Error, context, "evasion and luck must not be negative");
    }
    if !(1.0..=MAX_LEVEL).contains(&ship.lvl) {
        report.push(
            ValidationSeverity::Warning,
            context,
            format!("level {} is outside 1..={MAX_LEVEL}", ship.lvl),
        );
    }
    if ship.dmg_red.iter().any(|value| !(0.0..1.0).contains(value)) {
        report.push(ValidationSeverity::Error, context, "damage reduction must be within [0, 1)");
    }
}

fn check_duplicates<'a>(report: &mut ValidationReport, kind: &str, names: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(normalize_lookup(name)) {
            report.push(
                ValidationSeverity::Error,
                format!("{kind} '{name}'"),
                format!("duplicate {kind} name"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::equipment::{Augment, Auxiliary};

    #[test]
    fn clean_catalog_has_no_errors() {
        let catalog = Catalog::from_parts(
            vec![Ship::new("Mutsuki", 1688.0, 250.0, 35.0, 125.0)],
            vec![Auxiliary::new("Repair Toolkit", 500.0, 0.0, 0.0, 0.05)],
            vec![Augment::new("Tier 3 Augment", 200.0, 15.0, 0.0)],
        );
        let report = validate_catalog(&catalog, &Scorer::default());
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
    }

    #[test]
    fn reports_duplicates_bad_stats_and_unknown_defaults() {
        let mut broken = Ship::new("Broken", 0.0, 10.0, 10.0, 125.0)
            .with_defaults(Some("Ghost Aux"), None, None);
        broken.dmg_red = vec![1.5];
        let catalog = Catalog::from_parts(
            vec![
                broken,
                Ship::new("Mutsuki", 1688.0, 250.0, 35.0, 125.0),
                Ship::new("mutsuki", 1688.0, 250.0, 35.0, 125.0),
            ],
            Vec::new(),
            Vec::new(),
        );
        let report = validate_catalog(&catalog, &Scorer::default());
        assert!(report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Warning), 1);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message == "duplicate ship name"));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.message.starts_with("default loadout cannot be scored")));
    }
}
