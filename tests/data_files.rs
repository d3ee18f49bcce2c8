//! Shipped data file tests
//!
//! The TOML files under data/ must load and validate.

use std::path::PathBuf;

use ability_forge::animation::MontageLibrary;
use ability_forge::core::GameplayConfig;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn test_gameplay_config_loads() {
    let config = GameplayConfig::load_from_toml(&data_path("gameplay.toml")).unwrap();
    assert_eq!(config.combat.crit_chance, 0.15);
    assert_eq!(config.timing.hit_probe_interval, 0.01);
    assert!(config.montage_end.interrupted.replicate);
    assert!(!config.montage_end.completed.replicate);
}

#[test]
fn test_montages_layer_over_defaults() {
    let mut library = MontageLibrary::with_defaults();
    let before = library.len();

    let added = library.load_from_toml(&data_path("montages.toml")).unwrap();
    assert_eq!(added, 2);
    assert_eq!(library.len(), before + 1);

    let secondary = library.get("staff_secondary").unwrap();
    assert_eq!(secondary.length, 1.8);
    assert!(secondary.full_body);
    assert!(secondary.window(1).is_some());
    assert!(library.contains("staff_taunt"));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = GameplayConfig::load_from_toml(&data_path("does_not_exist.toml"));
    assert!(matches!(result, Err(ability_forge::core::ConfigError::Io { .. })));
}
