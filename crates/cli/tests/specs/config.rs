//! `wq config` specs

use crate::prelude::*;

#[test]
fn prints_flag_values() {
    wq().args(&["config", "-w", "3", "-p", "2"])
        .passes()
        .stdout_has("worker_count = 3")
        .stdout_has("parallel_processes = 2");
}

#[test]
fn env_sets_timeout() {
    wq().env("WQ_TIMEOUT_MS", "250")
        .args(&["config"])
        .passes()
        .stdout_has("timeout_ms = 250");
}

#[test]
fn reads_config_file() {
    let ws = Workspace::new();
    ws.file("wq.toml", "parallel_processes = 4\niterable_name = \"path\"\n");
    ws.wq()
        .args(&["config", "--config", "wq.toml"])
        .passes()
        .stdout_has("parallel_processes = 4")
        .stdout_has("iterable_name = \"path\"");
}

#[test]
fn unknown_config_key_is_rejected() {
    let ws = Workspace::new();
    ws.file("wq.toml", "workers = 4\n");
    ws.wq()
        .args(&["config", "--config", "wq.toml"])
        .exits(2)
        .stderr_has("failed to load config");
}
