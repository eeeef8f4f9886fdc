//! Mock Terminal Implementation for Testing

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use openterm::error::{Error, Result};
use openterm::terminal::{SessionId, Terminal, TerminalFactoryRegistry};
use tokio::sync::Notify;

/// How a mock terminal's connect behaves
#[derive(Debug, Clone)]
pub enum Behaviour {
    Succeed,
    Fail(String),
    /// Wait for the gate to open, then succeed
    Gated(Arc<Notify>),
}

/// Mock Terminal for testing
#[derive(Debug)]
pub struct MockTerminal {
    id: SessionId,
    protocol: String,
    behaviour: Behaviour,
    connected: AtomicBool,
    connect_calls: AtomicUsize,
    connects_running: AtomicUsize,
    disconnect_calls: AtomicUsize,
    last_target: Mutex<Option<(String, u16, bool)>>,
}

impl MockTerminal {
    pub fn new(protocol: &str, behaviour: Behaviour) -> Self {
        Self {
            id: SessionId::new(),
            protocol: protocol.to_string(),
            behaviour,
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            connects_running: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            last_target: Mutex::new(None),
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Connect futures that have started and not yet finished or been dropped
    pub fn connects_running(&self) -> usize {
        self.connects_running.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    /// Address, port and encryption flag of the last connect
    pub fn last_target(&self) -> Option<(String, u16, bool)> {
        self.last_target.lock().unwrap().clone()
    }
}

#[async_trait]
impl Terminal for MockTerminal {
    fn id(&self) -> SessionId {
        self.id
    }

    fn protocol_type(&self) -> &str {
        &self.protocol
    }

    async fn connect(&self, address: &str, port: u16, use_encryption: bool) -> Result<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.connects_running.fetch_add(1, Ordering::SeqCst);
        let _running = RunningGuard(&self.connects_running);
        *self.last_target.lock().unwrap() = Some((address.to_string(), port, use_encryption));

        match &self.behaviour {
            Behaviour::Succeed => {}
            Behaviour::Fail(reason) => {
                return Err(Error::ConnectionFailed {
                    host: format!("{}:{}", address, port),
                    reason: reason.clone(),
                })
            }
            Behaviour::Gated(gate) => gate.notified().await,
        }

        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Counts a connect as finished when its future completes or is dropped
struct RunningGuard<'a>(&'a AtomicUsize);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock Terminal Factory for testing
///
/// Each terminal it builds takes the next scripted behaviour (or
/// [`Behaviour::Succeed`] when the script is empty) and is kept so tests
/// can inspect it afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockTerminalFactory {
    script: Arc<Mutex<VecDeque<Behaviour>>>,
    created: Arc<Mutex<Vec<Arc<MockTerminal>>>>,
}

impl MockTerminalFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the behaviour of the next terminal created
    pub fn push(&self, behaviour: Behaviour) {
        self.script.lock().unwrap().push_back(behaviour);
    }

    /// Bind `tag` to this factory in `registry`
    pub fn register(&self, registry: &mut TerminalFactoryRegistry, tag: &str) {
        let factory = self.clone();
        let protocol = tag.to_string();
        registry.register(tag, move || {
            let behaviour = factory
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Behaviour::Succeed);
            let terminal = Arc::new(MockTerminal::new(&protocol, behaviour));
            factory.created.lock().unwrap().push(Arc::clone(&terminal));
            terminal as Arc<dyn Terminal>
        });
    }

    /// Registry with every tag bound to this factory
    pub fn registry(&self, tags: &[&str]) -> Arc<TerminalFactoryRegistry> {
        let mut registry = TerminalFactoryRegistry::new();
        for tag in tags {
            self.register(&mut registry, tag);
        }
        Arc::new(registry)
    }

    /// Terminals created so far, oldest first
    pub fn created(&self) -> Vec<Arc<MockTerminal>> {
        self.created.lock().unwrap().clone()
    }

    pub fn terminal_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}
