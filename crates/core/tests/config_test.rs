use modwatch_core::config::{Config, WatchConfig};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_watch_config_defaults() {
    let config = WatchConfig::default();
    assert!(config.paths.is_empty());
    assert!(config.excludes.is_empty());
    assert_eq!(config.quiet_period_ms, 200);
    assert_eq!(config.quiet_period(), Duration::from_millis(200));
    assert_eq!(config.event_buffer, 1024);
    assert_eq!(config.output_buffer, 1);
}

#[test]
fn test_default_config_needs_a_path() {
    let mut config = Config::default();
    let result = config.validate();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("at least one path"));

    config.watch.paths.push(PathBuf::from("."));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_toml() {
    let toml_content = r#"
        [watch]
        paths = ["src", "Cargo.toml"]
        excludes = ["*.swp", "target"]
        quiet_period_ms = 150

        [logging]
        level = "warn"
    "#;

    let config = Config::from_toml_str(toml_content).unwrap();
    assert_eq!(
        config.watch.paths,
        vec![PathBuf::from("src"), PathBuf::from("Cargo.toml")]
    );
    assert_eq!(config.watch.excludes, vec!["*.swp", "target"]);
    assert_eq!(config.watch.quiet_period_ms, 150);
    assert_eq!(config.watch.event_buffer, 1024);
    assert_eq!(config.logging.level, "warn");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_save_and_load() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.watch.paths = vec![PathBuf::from("/srv/site")];
    config.watch.excludes = vec!["*.log".to_string()];
    config.watch.quiet_period_ms = 750;
    std::fs::write(&config_path, toml::to_string(&config).unwrap()).unwrap();

    let loaded = Config::load(Some(&config_path)).unwrap();
    assert_eq!(loaded.watch, config.watch);
    assert_eq!(loaded.logging, config.logging);
}
