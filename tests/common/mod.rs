//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use paybutton::{
    ButtonConfig, ButtonOptions, HeadlessHost, PayButton, PayButtonError, Result, StatusSource,
    TransactionStatus, WidgetConfig,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const EMBED_TOKEN: &str = "tok_test_4f2a";
pub const REFERENCE: &str = "order-1001";

/// Scripted answer of a [`ScriptedSource`]
#[derive(Debug, Clone)]
pub enum Reply {
    Status(TransactionStatus),
    Fail(u16),
}

/// Status source answering from a script, then repeating a fallback
#[derive(Debug)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedSource {
    pub fn new(fallback: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Source that always reports a pending transaction
    pub fn pending() -> Self {
        Self::new(Reply::Status(pending_status()))
    }

    pub fn then(self, reply: Reply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, reference: &str, embed_token: &str) -> Result<TransactionStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .push((reference.to_string(), embed_token.to_string()));

        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Status(status) => Ok(status),
            Reply::Fail(status) => Err(PayButtonError::StatusRequest { status }),
        }
    }
}

pub fn pending_status() -> TransactionStatus {
    TransactionStatus::new(false).with_status("pending")
}

pub fn accepted_status() -> TransactionStatus {
    TransactionStatus::new(true)
        .with_id("tx-77")
        .with_status("confirmed")
}

pub fn options() -> ButtonOptions {
    ButtonOptions::new(EMBED_TOKEN)
        .with_usd("42.00")
        .with_reference(REFERENCE)
}

/// Build a button over a headless host and a scripted source
pub fn button_with(
    options: ButtonOptions,
    source: Arc<ScriptedSource>,
) -> (PayButton, Arc<HeadlessHost>) {
    let host = Arc::new(HeadlessHost::new());
    let config = ButtonConfig::resolve(options).expect("valid options");
    let button = PayButton::new(config, host.clone(), source, &WidgetConfig::default())
        .expect("valid widget config");
    (button, host)
}
