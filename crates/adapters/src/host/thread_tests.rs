// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::worker::{HandlerError, ItemContext};
use async_trait::async_trait;
use std::time::Duration;
use wq_core::{wire, Message, MessageKind, WorkItem};

struct UpperHandler;

#[async_trait]
impl ItemHandler for UpperHandler {
    async fn process(
        &self,
        item: WorkItem,
        _ctx: ItemContext,
    ) -> Result<serde_json::Value, HandlerError> {
        if item.to_string() == "explode" {
            panic!("boom");
        }
        Ok(serde_json::Value::String(item.to_string().to_uppercase()))
    }
}

fn host() -> (ThreadHost, mpsc::UnboundedReceiver<HostEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ThreadHost::new(Arc::new(UpperHandler), None, tx), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<HostEvent>) -> HostEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for host event")
        .expect("event channel closed")
}

fn dispatch(item: &str) -> Vec<u8> {
    wire::encode(&Message::dispatch(WorkItem::from(item))).unwrap()
}

#[tokio::test]
async fn worker_thread_processes_dispatched_item() {
    let (mut host, mut rx) = host();
    let worker = WorkerId::new("worker-1");
    host.spawn(&worker).unwrap();
    host.send(&worker, dispatch("abc")).unwrap();

    let mut kinds = Vec::new();
    while kinds.last() != Some(&MessageKind::Complete) {
        match next_event(&mut rx).await {
            HostEvent::Frame { worker: from, frame } => {
                assert_eq!(from, worker);
                let msg = wire::decode(&frame).unwrap();
                if let Message::Complete { detail, .. } = &msg {
                    assert_eq!(detail, &serde_json::json!("ABC"));
                }
                kinds.push(msg.kind());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(kinds, vec![MessageKind::Success, MessageKind::Complete]);
    host.terminate(&worker);
}

#[tokio::test]
async fn terminate_ends_worker_cleanly() {
    let (mut host, mut rx) = host();
    let worker = WorkerId::new("worker-1");
    host.spawn(&worker).unwrap();
    assert_eq!(host.live_count(), 1);

    host.terminate(&worker);
    assert_eq!(host.live_count(), 0);
    assert_eq!(
        next_event(&mut rx).await,
        HostEvent::Exited {
            worker,
            crashed: None
        }
    );
}

#[tokio::test]
async fn handler_panic_reports_crash() {
    let (mut host, mut rx) = host();
    let worker = WorkerId::new("worker-1");
    host.spawn(&worker).unwrap();
    host.send(&worker, dispatch("explode")).unwrap();

    match next_event(&mut rx).await {
        HostEvent::Exited { worker: w, crashed } => {
            assert_eq!(w, worker);
            assert!(crashed.unwrap().contains("boom"));
        }
        other => panic!("expected exit, got {:?}", other),
    }
}

#[test]
fn send_to_unknown_worker_fails() {
    let (mut host, _rx) = host();
    let err = host.send(&WorkerId::new("ghost"), dispatch("a")).unwrap_err();
    assert!(matches!(err, HostError::NotFound(_)));
}
