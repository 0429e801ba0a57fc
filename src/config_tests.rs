use super::{load_config, validate_config, write_config, RunConfig, CONFIG_SCHEMA_VERSION};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_run_root(name: &str) -> std::path::PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("{name}-{}-{now}", std::process::id()));
    std::fs::create_dir_all(&root).expect("create temp root");
    root
}

#[test]
fn missing_config_falls_back_to_defaults() {
    let root = temp_run_root("beanpack-config-missing");
    let config = load_config(&root).expect("load config");
    assert_eq!(config, RunConfig::default());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn written_config_is_loaded_back() {
    let root = temp_run_root("beanpack-config-roundtrip");
    let config = RunConfig {
        enrich: true,
        ignore_dirs: vec!["fixtures".to_string()],
        ..RunConfig::default()
    };
    write_config(&root, &config).expect("write config");
    let loaded = load_config(&root).expect("load config");
    assert_eq!(loaded, config);
    assert!(loaded.ignores_dir("fixtures"));
    assert!(loaded.ignores_dir("node_modules"));
    assert!(!loaded.ignores_dir("src"));
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn validation_rejects_bad_values() {
    let wrong_schema = RunConfig {
        schema_version: CONFIG_SCHEMA_VERSION + 1,
        ..RunConfig::default()
    };
    assert!(validate_config(&wrong_schema).is_err());

    let zero_limit = RunConfig {
        max_file_bytes: 0,
        ..RunConfig::default()
    };
    assert!(validate_config(&zero_limit).is_err());

    let nested_dir = RunConfig {
        ignore_dirs: vec!["src/gen".to_string()],
        ..RunConfig::default()
    };
    assert!(validate_config(&nested_dir).is_err());
}

#[test]
fn partial_config_uses_field_defaults() {
    let root = temp_run_root("beanpack-config-partial");
    std::fs::write(root.join("beanpack.json"), r#"{"schema_version": 1}"#)
        .expect("write config");
    let config = load_config(&root).expect("load config");
    assert!(!config.enrich);
    assert_eq!(config.max_file_bytes, super::DEFAULT_MAX_FILE_BYTES);
    let _ = std::fs::remove_dir_all(root);
}
