// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("wq.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn defaults_without_overrides() {
    let config = PoolArgs::default().resolve(EnvOverrides::default()).unwrap();
    assert_eq!(config, PoolConfig::default());
}

#[test]
fn env_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let args = PoolArgs {
        config: Some(write_config(&dir, "worker_count = 3\ntimeout_ms = 500\n")),
        ..PoolArgs::default()
    };
    let env = EnvOverrides {
        workers: Some(7),
        ..EnvOverrides::default()
    };

    let config = args.resolve(env).unwrap();

    assert_eq!(config.worker_count, 7);
    assert_eq!(config.timeout_ms, Some(500));
}

#[test]
fn flags_override_env() {
    let args = PoolArgs {
        workers: Some(2),
        log_dir: Some(PathBuf::from("/tmp/flag-logs")),
        no_retry: true,
        name: Some("url".to_string()),
        ..PoolArgs::default()
    };
    let env = EnvOverrides {
        workers: Some(9),
        log_dir: Some(PathBuf::from("/tmp/env-logs")),
        timeout_ms: Some(250),
    };

    let config = args.resolve(env).unwrap();

    assert_eq!(config.worker_count, 2);
    assert_eq!(
        config.log_location.as_deref(),
        Some(Path::new("/tmp/flag-logs"))
    );
    assert_eq!(config.timeout_ms, Some(250));
    assert!(!config.retry_on_fail);
    assert_eq!(config.iterable_name, "url");
}

#[yare::parameterized(
    zero_workers  = { Some(0), None },
    zero_parallel = { None, Some(0) },
)]
fn invalid_values_are_rejected(workers: Option<usize>, parallel: Option<usize>) {
    let args = PoolArgs {
        workers,
        parallel,
        ..PoolArgs::default()
    };
    let err = args.resolve(EnvOverrides::default()).unwrap_err();
    assert!(err.to_string().contains("must be greater than 0"), "{err}");
}

#[test]
fn missing_config_file_names_the_path() {
    let args = PoolArgs {
        config: Some(PathBuf::from("/nonexistent/wq.toml")),
        ..PoolArgs::default()
    };
    let err = args.resolve(EnvOverrides::default()).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/wq.toml"));
}
