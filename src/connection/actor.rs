//! Connection Actor
//!
//! Runs a [`ConnectionManager`] on its own task and feeds it from one
//! command queue. Connects are driven on spawned tasks; their outcomes come
//! back through the same queue, so every state change happens on the actor
//! task in the order it was received.
//!
//! ```text
//! ┌──────────────────┐  Command   ┌──────────────────┐   spawn   ┌─────────────┐
//! │ ConnectionHandle │───────────▶│   actor loop     │──────────▶│ connect task│
//! └──────────────────┘            │ (manager owner)  │◀──────────│             │
//!          ▲                      └──────────────────┘ Completed └─────────────┘
//!          │   ConnectionEvent             │
//!          └───────────────────────────────┘
//! ```

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{ConnectOutcome, ConnectionManager, ConnectionSnapshot, ConnectionState};
use crate::display::{DisplayPreferences, DisplaySurface};
use crate::error::{Error, Result};
use crate::models::Host;
use crate::terminal::SessionId;

/// Notifications for the front end
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    StateChanged(ConnectionState),
    TitleChanged(String),
    /// Shown to the user as a failure notice
    ConnectionFailed { host: String, message: String },
}

#[derive(Debug)]
enum Command {
    Connect {
        host: Host,
        reply: oneshot::Sender<Result<()>>,
    },
    Completed(ConnectOutcome),
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    ApplyPreferences(DisplayPreferences),
    Refresh,
    Snapshot {
        reply: oneshot::Sender<ConnectionSnapshot>,
    },
    Shutdown {
        force_process_exit: bool,
        reply: oneshot::Sender<bool>,
    },
}

/// Cloneable sender side of the actor
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ConnectionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::ActorStopped)
    }

    /// Queue a connect and return a receiver for its outcome.
    ///
    /// The command is queued before this returns, so two calls made one
    /// after the other are handled in that order.
    pub fn submit_connect(&self, host: Host) -> Result<oneshot::Receiver<Result<()>>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Connect { host, reply })?;
        Ok(rx)
    }

    /// Disconnect whatever is active, then connect to `host`
    pub async fn connect(&self, host: Host) -> Result<()> {
        let rx = self.submit_connect(host)?;
        rx.await.map_err(|_| Error::ActorStopped)?
    }

    pub async fn disconnect(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Disconnect { reply })?;
        rx.await.map_err(|_| Error::ActorStopped)
    }

    pub fn apply_preferences(&self, preferences: DisplayPreferences) -> Result<()> {
        self.send(Command::ApplyPreferences(preferences))
    }

    pub fn refresh(&self) -> Result<()> {
        self.send(Command::Refresh)
    }

    pub async fn snapshot(&self) -> Result<ConnectionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| Error::ActorStopped)
    }

    /// Disconnect, stop the actor and report whether the process should exit
    pub async fn shutdown(&self, force_process_exit: bool) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown {
            force_process_exit,
            reply,
        })?;
        rx.await.map_err(|_| Error::ActorStopped)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The connect task currently driving a terminal
struct InFlightConnect {
    session: SessionId,
    host: String,
    task: JoinHandle<()>,
}

struct ConnectionActor<D: DisplaySurface> {
    manager: ConnectionManager<D>,
    inbox: mpsc::UnboundedReceiver<Command>,
    completions: mpsc::WeakUnboundedSender<Command>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    pending_replies: HashMap<SessionId, oneshot::Sender<Result<()>>>,
    in_flight: Option<InFlightConnect>,
    last_state: ConnectionState,
    last_title: String,
}

/// Start the actor on the current tokio runtime.
///
/// The join handle yields the manager back once the actor stops, either on
/// [`ConnectionHandle::shutdown`] or when every handle has been dropped.
pub fn spawn<D>(
    manager: ConnectionManager<D>,
) -> (
    ConnectionHandle,
    mpsc::UnboundedReceiver<ConnectionEvent>,
    JoinHandle<ConnectionManager<D>>,
)
where
    D: DisplaySurface + 'static,
{
    let (tx, inbox) = mpsc::unbounded_channel();
    let (events, events_rx) = mpsc::unbounded_channel();

    let actor = ConnectionActor {
        last_state: manager.state().clone(),
        last_title: manager.title().to_string(),
        manager,
        inbox,
        completions: tx.downgrade(),
        events,
        pending_replies: HashMap::new(),
        in_flight: None,
    };

    let join = tokio::spawn(actor.run());
    (ConnectionHandle { tx }, events_rx, join)
}

impl<D: DisplaySurface> ConnectionActor<D> {
    async fn run(mut self) -> ConnectionManager<D> {
        info!("Connection actor started");

        while let Some(command) = self.inbox.recv().await {
            match command {
                Command::Connect { host, reply } => self.handle_connect(host, reply).await,
                Command::Completed(outcome) => self.handle_completion(outcome).await,
                Command::Disconnect { reply } => {
                    self.cancel_in_flight().await;
                    self.manager.disconnect().await;
                    self.publish_changes();
                    let _ = reply.send(());
                }
                Command::ApplyPreferences(preferences) => {
                    self.manager.apply_preferences(&preferences);
                }
                Command::Refresh => self.manager.refresh(),
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.manager.snapshot());
                }
                Command::Shutdown {
                    force_process_exit,
                    reply,
                } => {
                    for (_, pending) in self.pending_replies.drain() {
                        let _ = pending.send(Err(Error::ActorStopped));
                    }
                    self.cancel_in_flight().await;
                    let exit = self.manager.shutdown(force_process_exit).await;
                    self.publish_changes();
                    let _ = reply.send(exit);
                    break;
                }
            }
        }

        info!("Connection actor stopped");
        self.manager
    }

    async fn handle_connect(&mut self, host: Host, reply: oneshot::Sender<Result<()>>) {
        self.cancel_in_flight().await;
        self.manager.disconnect().await;

        let pending = match self.manager.begin_connect(&host) {
            Ok(pending) => pending,
            Err(e) => {
                self.publish_failure(&host, &e);
                self.publish_changes();
                let _ = reply.send(Err(e));
                return;
            }
        };
        self.publish_changes();

        let session = pending.session();
        let Some(completions) = self.completions.upgrade() else {
            let _ = reply.send(Err(Error::ActorStopped));
            return;
        };
        self.pending_replies.insert(session, reply);

        debug!("Driving connect for session {} on a background task", session);
        let task = tokio::spawn(async move {
            let outcome = pending.run().await;
            let _ = completions.send(Command::Completed(outcome));
        });
        self.in_flight = Some(InFlightConnect {
            session,
            host: host.to_string(),
            task,
        });
    }

    /// Abort the running connect task, if any, and release its terminal.
    ///
    /// An outcome the task already queued is still discarded as stale by
    /// the manager when it is dequeued.
    async fn cancel_in_flight(&mut self) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };

        in_flight.task.abort();
        if let Err(e) = in_flight.task.await {
            if e.is_cancelled() {
                debug!("Cancelled connect for session {}", in_flight.session);
            } else {
                warn!("Connect task for session {} failed: {}", in_flight.session, e);
            }
        }

        if let Some(reply) = self.pending_replies.remove(&in_flight.session) {
            let _ = reply.send(Err(Error::Superseded {
                host: in_flight.host,
            }));
        }
    }

    async fn handle_completion(&mut self, outcome: ConnectOutcome) {
        let session = outcome.session;
        let host = outcome.host.clone();
        if self.in_flight.as_ref().map(|f| f.session) == Some(session) {
            self.in_flight = None;
        }

        let result = self.manager.complete_connect(outcome).await;
        if let Err(e) = &result {
            if !matches!(e, Error::Superseded { .. }) {
                self.publish_failure(&host, e);
            }
        }
        self.publish_changes();

        if let Some(reply) = self.pending_replies.remove(&session) {
            let _ = reply.send(result);
        }
    }

    fn publish_failure(&self, host: &Host, err: &Error) {
        let _ = self.events.send(ConnectionEvent::ConnectionFailed {
            host: host.to_string(),
            message: err.user_message(),
        });
    }

    /// Emit events for whatever changed since the last publish
    fn publish_changes(&mut self) {
        if *self.manager.state() != self.last_state {
            self.last_state = self.manager.state().clone();
            let _ = self
                .events
                .send(ConnectionEvent::StateChanged(self.last_state.clone()));
        }
        if self.manager.title() != self.last_title {
            self.last_title = self.manager.title().to_string();
            let _ = self
                .events
                .send(ConnectionEvent::TitleChanged(self.last_title.clone()));
        }
    }
}
