// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod crash;
mod dispatch;
mod hung;
mod lifecycle;
mod protocol;
mod retry;

use super::*;
use crate::error::PoolError;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wq_adapters::{FakeHost, HostCall};
use wq_core::{wire, FakeClock, Message};

type TestOrchestrator = Orchestrator<FakeHost, FakeClock>;

struct Harness {
    orch: TestOrchestrator,
    host: FakeHost,
    clock: FakeClock,
    completions: Arc<AtomicUsize>,
}

fn config(workers: usize, parallel: usize) -> PoolConfig {
    PoolConfig {
        worker_count: workers,
        parallel_processes: parallel,
        ..PoolConfig::default()
    }
}

fn setup(config: PoolConfig) -> Harness {
    setup_with_log(config, LogWriter::disabled())
}

fn setup_with_log(config: PoolConfig, log: LogWriter) -> Harness {
    let host = FakeHost::new();
    let clock = FakeClock::new();
    let mut orch = Orchestrator::new(config, host.clone(), clock.clone(), log);

    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    orch.set_completion_handler(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    Harness {
        orch,
        host,
        clock,
        completions,
    }
}

fn items(names: &[&str]) -> Vec<WorkItem> {
    names.iter().map(|n| WorkItem::from(*n)).collect()
}

fn worker(n: usize) -> WorkerId {
    WorkerId::new(format!("worker-{}", n))
}

impl Harness {
    fn start(&mut self, names: &[&str]) {
        self.orch.set_work_list(items(names)).unwrap();
        self.orch.start().unwrap();
    }

    fn send(&mut self, worker: &WorkerId, msg: Message) {
        let frame = wire::encode(&msg).unwrap();
        self.orch.handle_frame(worker, &frame);
    }

    fn complete(&mut self, worker: &WorkerId, item: &str) {
        self.send(worker, Message::complete(WorkItem::from(item), json!(null)));
    }

    fn succeed(&mut self, worker: &WorkerId, item: &str) {
        self.send(worker, Message::success(WorkItem::from(item), "ok"));
        self.send(worker, Message::complete(WorkItem::from(item), json!("ok")));
    }

    fn fail(&mut self, worker: &WorkerId, item: &str) {
        self.send(worker, Message::failure(WorkItem::from(item), "bad"));
        self.complete(worker, item);
    }

    fn error(&mut self, worker: &WorkerId, item: &str) {
        self.send(worker, Message::error(WorkItem::from(item), "boom"));
        self.complete(worker, item);
    }

    /// Items dispatched so far, across all workers, in send order.
    fn dispatched(&self) -> Vec<String> {
        self.host
            .dispatched()
            .into_iter()
            .map(|(_, item)| item.to_string())
            .collect()
    }

    fn dispatched_to(&self, worker: &WorkerId) -> Vec<String> {
        self.host
            .dispatched_to(worker)
            .into_iter()
            .map(|item| item.to_string())
            .collect()
    }

    /// Items currently held by `worker`, oldest first.
    fn in_flight(&self, worker: &WorkerId) -> Vec<String> {
        self.orch
            .workers
            .get(worker)
            .map(|h| h.in_flight.iter().map(|r| r.item.to_string()).collect())
            .unwrap_or_default()
    }

    /// Answer every in-flight item until the run goes quiet. Items listed
    /// in `fail_first` fail on their first attempt and succeed after.
    fn drive(&mut self, fail_first: &[&str]) {
        let mut attempts: HashMap<String, u32> = HashMap::new();
        loop {
            let next = self
                .orch
                .worker_ids()
                .into_iter()
                .find_map(|w| self.in_flight(&w).first().cloned().map(|item| (w, item)));
            let Some((w, item)) = next else {
                return;
            };
            let attempt = attempts.entry(item.clone()).or_default();
            *attempt += 1;
            if *attempt == 1 && fail_first.contains(&item.as_str()) {
                self.fail(&w, &item);
            } else {
                self.succeed(&w, &item);
            }
        }
    }

    fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}
