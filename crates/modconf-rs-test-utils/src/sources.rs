use async_trait::async_trait;
use modconf_rs_config::{ConfigError, ExternalSource};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Scriptable external source that counts how often it is loaded.
#[derive(Clone)]
pub struct StubSource {
    located: bool,
    outcome: Result<Value, String>,
    loads: Arc<AtomicUsize>,
    gate: Option<Arc<Notify>>,
}

impl StubSource {
    /// A located source that loads `value`.
    pub fn new(value: Value) -> Self {
        Self {
            located: true,
            outcome: Ok(value),
            loads: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// A source that cannot be located.
    pub fn missing() -> Self {
        Self {
            located: false,
            ..Self::new(Value::Null)
        }
    }

    /// A located source whose load fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            ..Self::new(Value::Null)
        }
    }

    /// Hold every load until the returned gate is opened.
    pub fn gated(mut self) -> (Self, SourceGate) {
        let notify = Arc::new(Notify::new());
        self.gate = Some(notify.clone());
        (self, SourceGate(notify))
    }

    /// Number of loads started so far, across clones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExternalSource for StubSource {
    fn locate(&self) -> bool {
        self.located
    }

    async fn load(&self) -> Result<Value, ConfigError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone().map_err(ConfigError::Invalid)
    }
}

/// Releases a gated `StubSource`.
pub struct SourceGate(Arc<Notify>);

impl SourceGate {
    /// Let the pending (or next) load finish.
    pub fn open(&self) {
        self.0.notify_one();
    }
}
