// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_toml_gives_defaults() {
    let config = PoolConfig::from_toml_str("").unwrap();
    assert!(config.worker_count >= 1);
    assert_eq!(config.parallel_processes, 1);
    assert!(config.retry_on_fail);
    assert!(config.auto_start);
    assert_eq!(config.iterable_name, "item");
    assert_eq!(config.log_location, None);
    assert_eq!(config.timeout(), None);
}

#[test]
fn full_toml_parses() {
    let config = PoolConfig::from_toml_str(
        r#"
worker_count = 3
parallel_processes = 4
retry_on_fail = false
auto_start = false
log_location = "out/logs"
iterable_name = "url"
timeout_ms = 1500
stats_interval_secs = 30
"#,
    )
    .unwrap();

    assert_eq!(config.worker_count, 3);
    assert_eq!(config.parallel_processes, 4);
    assert!(!config.retry_on_fail);
    assert!(!config.auto_start);
    assert_eq!(config.log_location, Some(PathBuf::from("out/logs")));
    assert_eq!(config.iterable_name, "url");
    assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    assert_eq!(config.scan_interval(), Some(Duration::from_millis(3000)));
    assert_eq!(config.stats_interval(), Some(Duration::from_secs(30)));
}

#[yare::parameterized(
    zero_workers  = { "worker_count = 0",          "worker_count must be greater than 0" },
    zero_parallel = { "parallel_processes = 0",    "parallel_processes must be greater than 0" },
    zero_timeout  = { "timeout_ms = 0",            "timeout_ms must be greater than 0" },
    zero_stats    = { "stats_interval_secs = 0",   "stats_interval_secs must be greater than 0" },
    blank_name    = { "iterable_name = \"  \"",    "iterable_name must not be empty" },
)]
fn invalid_values_are_rejected(toml_text: &str, message: &str) {
    let err = PoolConfig::from_toml_str(toml_text).unwrap_err();
    assert_eq!(err.to_string(), format!("invalid config: {}", message));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = PoolConfig::from_toml_str("workers = 2").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reports_missing_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    let err = PoolConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wq.toml");
    std::fs::write(&path, "worker_count = 2\n").unwrap();
    assert_eq!(PoolConfig::load(&path).unwrap().worker_count, 2);
}

#[test]
fn toml_output_round_trips_through_parser() {
    let config = PoolConfig {
        worker_count: 2,
        timeout_ms: Some(100),
        ..PoolConfig::default()
    };
    let text = config.to_toml_string().unwrap();
    assert_eq!(PoolConfig::from_toml_str(&text).unwrap(), config);
}
