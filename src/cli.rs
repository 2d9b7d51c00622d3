use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::AppConfig;
use crate::data::catalog::Catalog;
use crate::data::equipment::EquipmentSelection;
use crate::data::import::{import_file, ImportKind};
use crate::data::validate::{validate_catalog, ValidationSeverity};
use crate::ehp::{FormulaVariant, HealStacking, ScoreDisplay, ScoreError, Scorer};
use crate::ranking::rank_by_default_ehp;
use crate::server;

#[derive(Parser, Debug)]
#[command(name = "blueroad", version, about = "Effective HP calculator and fleet planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Ships,
    Auxiliary,
    Augments,
}

impl From<KindArg> for ImportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ships => ImportKind::Ships,
            KindArg::Auxiliary => ImportKind::Auxiliary,
            KindArg::Augments => ImportKind::Augments,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API and static frontend.
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Score one ship. Without item flags the ship's default loadout is used.
    Score {
        ship: String,
        #[arg(long)]
        aux_a: Option<String>,
        #[arg(long)]
        aux_b: Option<String>,
        #[arg(long)]
        augment: Option<String>,
        /// Score with every slot empty.
        #[arg(long, conflicts_with_all = ["aux_a", "aux_b", "augment"])]
        bare: bool,
        #[arg(long)]
        legacy: bool,
        #[arg(long)]
        single_source_heal: bool,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Rank every ship by default-loadout eHP.
    Rank {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Import a CSV or JSON source into a canonical catalog file.
    Import {
        #[arg(value_enum)]
        kind: KindArg,
        input: PathBuf,
        output: Option<PathBuf>,
    },
    /// Check the catalog for bad or inconsistent data.
    Validate { data_dir: Option<PathBuf> },
}

pub fn parse_command(args: &[String]) -> Result<Command, clap::Error> {
    Cli::try_parse_from(args).map(|cli| cli.command)
}

pub fn run_with_args(args: &[String]) -> i32 {
    let command = match parse_command(args) {
        Ok(command) => command,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 2;
        }
    };

    match command {
        Command::Serve { bind, data_dir } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            handle_serve(&config)
        }
        Command::Score {
            ship,
            aux_a,
            aux_b,
            augment,
            bare,
            legacy,
            single_source_heal,
            data_dir,
            json,
        } => {
            if legacy {
                config.formula = FormulaVariant::Legacy;
            }
            if single_source_heal {
                config.heal_stacking = HealStacking::SingleSource;
            }
            let items = ItemArgs {
                aux_a,
                aux_b,
                augment,
                bare,
            };
            handle_score(&config, data_dir.as_deref(), &ship, &items, json)
        }
        Command::Rank { limit, data_dir } => handle_rank(&config, data_dir.as_deref(), limit),
        Command::Import {
            kind,
            input,
            output,
        } => handle_import(&config, kind.into(), &input, output.as_deref()),
        Command::Validate { data_dir } => handle_validate(&config, data_dir.as_deref()),
    }
}

fn handle_serve(config: &AppConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn load_catalog(config: &AppConfig, data_dir: Option<&Path>) -> Result<Catalog, i32> {
    let dir = data_dir.unwrap_or(&config.data_dir);
    Catalog::load(dir).map_err(|err| {
        eprintln!("catalog error: {err}");
        1
    })
}

struct ItemArgs {
    aux_a: Option<String>,
    aux_b: Option<String>,
    augment: Option<String>,
    bare: bool,
}

fn handle_score(config: &AppConfig, data_dir: Option<&Path>, ship_name: &str, items: &ItemArgs, json: bool) -> i32 {
    let catalog = match load_catalog(config, data_dir) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };
    let scorer: Scorer = config.scorer();

    let Some(ship) = catalog.ship(ship_name) else {
        eprintln!("unknown ship '{ship_name}'");
        return 1;
    };

    let explicit = items.aux_a.is_some() || items.aux_b.is_some() || items.augment.is_some();
    let selection = if items.bare {
        Ok(EquipmentSelection::NONE)
    } else if explicit {
        catalog.selection_by_names(
            items.aux_a.as_deref(),
            items.aux_b.as_deref(),
            items.augment.as_deref(),
        )
    } else {
        Ok(catalog.default_selection(ship))
    };

    let scored = selection
        .and_then(|selection| catalog.loadout(selection))
        .map_err(ScoreError::from)
        .and_then(|loadout| scorer.score(ship, &loadout).map(|score| (loadout, score)));
    let (loadout, score) = match scored {
        Ok(scored) => scored,
        Err(err) => {
            eprintln!("score failed: {err}");
            return 1;
        }
    };

    let display = ScoreDisplay::for_score(score);
    let names = loadout.item_names();
    if json {
        let payload = serde_json::json!({
            "ship": ship.name,
            "equipment": names,
            "ehp": score,
            "display": display,
            "formula": scorer.variant,
            "heal_stacking": scorer.heal_stacking,
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize score: {err}");
                return 1;
            }
        }
    } else {
        println!(
            "{}\t{}\t{}\t{}\t{:.2}\t{:.1}%\t{}",
            ship.name,
            names.aux_a,
            names.aux_b,
            names.augment,
            score,
            display.percent,
            display.tier.as_str()
        );
    }
    0
}

fn handle_rank(config: &AppConfig, data_dir: Option<&Path>, limit: usize) -> i32 {
    let catalog = match load_catalog(config, data_dir) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };
    let ranked = rank_by_default_ehp(&catalog, &config.scorer());
    println!("rank\tship\tehp\ttier");
    for (position, entry) in ranked.iter().take(limit).enumerate() {
        println!(
            "{}\t{}\t{:.2}\t{}",
            position + 1,
            entry.name,
            entry.ehp,
            entry.display.tier.as_str()
        );
    }
    0
}

fn handle_import(config: &AppConfig, kind: ImportKind, input: &Path, output: Option<&Path>) -> i32 {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.data_dir.join(kind.catalog_file()));

    match import_file(kind, input, &output) {
        Ok(report) => {
            println!(
                "import complete: kind={}, imported={}, skipped={}, source='{}', output='{}'",
                report.kind,
                report.imported_records,
                report.skipped.len(),
                report.source_path,
                report.output_path
            );
            for skipped in &report.skipped {
                eprintln!("- skipped record {}: {}", skipped.index, skipped.reason);
            }
            0
        }
        Err(err) => {
            eprintln!("import failed: {err}");
            1
        }
    }
}

fn handle_validate(config: &AppConfig, data_dir: Option<&Path>) -> i32 {
    let dir = data_dir.unwrap_or(&config.data_dir);
    let catalog = match load_catalog(config, Some(dir)) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };
    let report = validate_catalog(&catalog, &config.scorer());

    for diag in &report.diagnostics {
        eprintln!("[{}] {}: {}", diag.severity, diag.context, diag.message);
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s), {} warning(s)",
            report.count(ValidationSeverity::Error),
            report.count(ValidationSeverity::Warning)
        );
        1
    } else {
        println!(
            "validation passed: {} ({} warning(s))",
            dir.display(),
            report.count(ValidationSeverity::Warning)
        );
        0
    }
}
