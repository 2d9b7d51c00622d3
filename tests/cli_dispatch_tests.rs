use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_blueroad")
}

fn data_dir() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .to_string_lossy()
        .into_owned()
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("blueroad-{name}-{stamp}.{extension}"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("BLUEROAD_CONFIG")
        .env_remove("BLUEROAD_FORMULA")
        .env_remove("BLUEROAD_HEAL_STACKING")
        .env("RUST_LOG", "off")
        .output()
        .expect("blueroad should run")
}

#[test]
fn score_command_emits_json_for_default_loadout() {
    let data = data_dir();
    let output = run(&["score", "Mutsuki", "--data-dir", &data, "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("score should emit json");
    assert_eq!(payload["ship"], "Mutsuki");
    assert_eq!(payload["equipment"]["aux_a"], "None");
    assert!((payload["ehp"].as_f64().unwrap() - 4313.39280516082).abs() < 1e-6);
    assert_eq!(payload["formula"], "canonical");
}

#[test]
fn score_command_accepts_item_names() {
    let data = data_dir();
    let output = run(&[
        "score",
        "mutsuki",
        "--aux-a",
        "Repair Toolkit",
        "--aux-b",
        "550 HP Aux",
        "--data-dir",
        &data,
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Mutsuki\tRepair Toolkit\t550 HP Aux\tNone\t7346.31\t"));
}

#[test]
fn score_command_supports_legacy_formula() {
    let data = data_dir();
    let output = run(&["score", "Mutsuki", "--legacy", "--data-dir", &data]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("\t3771.52\t"));
}

#[test]
fn score_command_fails_for_unknown_ship() {
    let data = data_dir();
    let output = run(&["score", "Yamato", "--data-dir", &data]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown ship 'Yamato'"));
}

#[test]
fn bare_conflicts_with_item_flags() {
    let data = data_dir();
    let output = run(&["score", "Mutsuki", "--bare", "--aux-a", "Repair Toolkit", "--data-dir", &data]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn rank_command_prints_ordered_table() {
    let data = data_dir();
    let output = run(&["rank", "--limit", "2", "--data-dir", &data]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "rank\tship\tehp\ttier");
    assert!(lines[1].starts_with("1\tEnterprise\t17850.94"));
    assert!(lines[2].starts_with("2\tKamikaze\t"));
}

#[test]
fn validate_command_passes_on_bundled_data() {
    let data = data_dir();
    let output = run(&["validate", &data]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("validation passed"));
}

#[test]
fn validate_command_returns_non_zero_on_invalid_data() {
    let dir = unique_temp_path("invalid-catalog", "d");
    fs::create_dir_all(&dir).expect("fixture dir should be created");
    fs::write(
        dir.join("ships.json"),
        r#"[{"name":"Broken","hp":0,"eva":10,"lck":10},{"name":"Broken","hp":100,"eva":10,"lck":10}]"#,
    )
    .expect("fixture should be written");

    let output = run(&["validate", dir.to_string_lossy().as_ref()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("validation failed"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn import_command_writes_canonical_file() {
    let input = unique_temp_path("aux-import", "csv");
    let output_path = unique_temp_path("aux-import-out", "json");
    fs::write(&input, "Name,HP,HPBoost,Rarity\nRepair Toolkit,500,0.05,T3\nNone,1,,\n")
        .expect("fixture should be written");

    let output = run(&[
        "import",
        "auxiliary",
        input.to_string_lossy().as_ref(),
        output_path.to_string_lossy().as_ref(),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("import complete: kind=auxiliary, imported=1, skipped=1"));
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written[0]["heal"], 0.05);

    let _ = fs::remove_file(input);
    let _ = fs::remove_file(output_path);
}

#[test]
fn import_command_requires_input_path() {
    let output = run(&["import", "ships"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_command_is_a_usage_error() {
    let output = run(&["simulate"]);
    assert_eq!(output.status.code(), Some(2));
}
