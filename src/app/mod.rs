//! Application shell
//!
//! Ties the pieces together the way the terminal window does: the host
//! registry and its menu, the favourites kept in the preference store,
//! display preferences, and the connection actor that owns the session.
//!
//! ## Module Organization
//!
//! - `mod.rs` - [`Application`] and the menu actions
//! - `menu.rs` - Connect menu model rebuilt from the host registry
//! - `console.rs` - Parsing of console input into menu actions

pub mod console;
pub mod menu;

pub use console::{ConsoleCommand, HELP};
pub use menu::{HostMenu, MenuItem};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{AppConfig, PreferenceStore};
use crate::connection::{
    self, ConnectionEvent, ConnectionHandle, ConnectionManager, ConnectionSnapshot,
    ConnectionState,
};
use crate::display::{ColorTarget, DisplayPreferences, DisplaySurface, NamedColor};
use crate::error::{Error, Result};
use crate::favourites::FavouritesStore;
use crate::hosts::HostRegistry;
use crate::models::Host;
use crate::terminal::TerminalFactoryRegistry;

/// What the front end should do after a console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Done,
    Message(String),
    Exit { terminate_process: bool },
}

/// Everything a running [`Application`] hands back to its front end
pub struct Started<P: PreferenceStore, D: DisplaySurface> {
    pub app: Application<P>,
    pub events: mpsc::UnboundedReceiver<ConnectionEvent>,
    pub actor: JoinHandle<ConnectionManager<D>>,
}

pub struct Application<P: PreferenceStore> {
    config: AppConfig,
    prefs: P,
    favourites: FavouritesStore,
    hosts: HostRegistry,
    menu: HostMenu,
    preferences: DisplayPreferences,
    protocol_types: Vec<String>,
    connection: ConnectionHandle,
}

impl<P: PreferenceStore> Application<P> {
    /// Load favourites, add the startup host and start the connection actor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<D>(
        config: AppConfig,
        mut prefs: P,
        factories: Arc<TerminalFactoryRegistry>,
        display: D,
        startup_host: Option<Host>,
    ) -> Started<P, D>
    where
        D: DisplaySurface + 'static,
    {
        let favourites = FavouritesStore::new();
        let mut hosts = HostRegistry::from_hosts(favourites.load(&prefs));

        if let Some(host) = startup_host {
            info!("Adding startup host {}", host);
            if host.is_favourite() {
                hosts.add_favourite(host);
                if let Err(e) = favourites.persist(&mut prefs, hosts.hosts()) {
                    warn!("{}", e);
                }
            } else {
                hosts.push(host);
            }
        }

        let preferences = DisplayPreferences::load(&config.display, &prefs);
        let protocol_types = factories.protocol_types();

        let mut manager =
            ConnectionManager::new(factories, display, config.product_name.clone());
        manager.set_not_connected_title();
        manager.apply_preferences(&preferences);

        let (connection, events, actor) = connection::spawn(manager);
        let menu = HostMenu::build(hosts.hosts());

        info!(
            "{} started with {} known hosts",
            config.product_name,
            hosts.len()
        );

        Started {
            app: Self {
                config,
                prefs,
                favourites,
                hosts,
                menu,
                preferences,
                protocol_types,
                connection,
            },
            events,
            actor,
        }
    }

    /// Connect to the only known host, if auto-connect is enabled.
    ///
    /// Returns `None` when no connection was attempted.
    pub async fn auto_connect(&self) -> Option<Result<()>> {
        if !self.config.auto_connect || self.hosts.len() != 1 {
            return None;
        }
        let host = self.hosts.get(0)?.clone();
        info!("Auto-connecting to {}", host);
        Some(self.connection.connect(host).await)
    }

    /// Connect to the host at a registry position
    pub async fn connect_to(&self, index: usize) -> Result<()> {
        let host = self
            .hosts
            .get(index)
            .cloned()
            .ok_or(Error::HostNotFound { index })?;
        self.connection.connect(host).await
    }

    /// Connect to a host entered by the user and remember it if it is a
    /// favourite, whether or not the connection worked.
    pub async fn add_new_host(&mut self, host: Host) -> Result<()> {
        let result = self.connection.connect(host.clone()).await;

        if self.hosts.add_favourite(host) {
            self.persist_favourites();
            self.rebuild_menu();
        }

        result
    }

    /// Replace the host list with an edited one
    pub fn organize_favourites(&mut self, hosts: Vec<Host>) {
        self.hosts.replace_all(hosts);
        self.persist_favourites();
        self.rebuild_menu();
    }

    /// Replace the host list with the hosts at `positions`, in that order
    pub fn organize_by_positions(&mut self, positions: &[usize]) -> Result<()> {
        let hosts = positions
            .iter()
            .map(|&index| {
                self.hosts
                    .get(index)
                    .cloned()
                    .ok_or(Error::HostNotFound { index })
            })
            .collect::<Result<Vec<_>>>()?;
        self.organize_favourites(hosts);
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.connection.disconnect().await
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        self.preferences.set_font_size(size)?;
        self.push_preferences()
    }

    pub fn set_color(&mut self, target: ColorTarget, color: NamedColor) -> Result<()> {
        self.preferences.set_color(target, color);
        self.push_preferences()
    }

    pub fn set_fkey_bar(&mut self, enabled: bool) -> Result<()> {
        if let Err(e) = self.preferences.set_fkey_bar(enabled, &mut self.prefs) {
            warn!("F-key bar setting not saved: {}", e);
        }
        self.push_preferences()
    }

    /// Forget everything in the preference store.
    ///
    /// Stored display settings fall back to their defaults right away. Font
    /// and colour changes are never stored and stay as they are, and so do
    /// the hosts already in the menu until the next start.
    pub fn clear_saved_preferences(&mut self) -> Result<()> {
        info!("Clearing saved preferences");
        self.prefs.clear_prefs()?;
        self.preferences.fkey_bar =
            DisplayPreferences::load(&self.config.display, &self.prefs).fkey_bar;
        self.push_preferences()
    }

    /// Shut the connection down. Returns whether the process should exit,
    /// which is never the case when embedded.
    pub async fn exit(&self) -> Result<bool> {
        self.connection.shutdown(!self.config.embedded).await
    }

    pub async fn status(&self) -> Result<ConnectionSnapshot> {
        self.connection.snapshot().await
    }

    /// Host of the live session
    pub async fn active_host(&self) -> Result<Host> {
        match self.status().await?.state {
            ConnectionState::Connected { host, .. } => Ok(host),
            _ => Err(Error::NotConnected),
        }
    }

    pub fn about(&self) -> String {
        format!(
            "{} {}\nRemote terminal client for {} hosts",
            self.config.product_name,
            crate::VERSION,
            self.config.default_protocol
        )
    }

    /// Run one console command
    pub async fn handle_command(&mut self, command: ConsoleCommand) -> Result<CommandOutcome> {
        match command {
            ConsoleCommand::Hosts => Ok(CommandOutcome::Message(self.menu.render())),
            ConsoleCommand::Connect(index) => {
                self.connect_to(index).await?;
                Ok(CommandOutcome::Done)
            }
            ConsoleCommand::New {
                host,
                port,
                protocol_type,
                encryption,
                favourite,
            } => {
                let protocol_type =
                    protocol_type.unwrap_or_else(|| self.config.default_protocol.clone());
                let host =
                    Host::new(host, port, protocol_type, encryption)?.with_favourite(favourite);
                match self.add_new_host(host).await {
                    Ok(()) => Ok(CommandOutcome::Done),
                    Err(e) if e.is_unknown_protocol() => Ok(CommandOutcome::Message(format!(
                        "Available protocol types: {}",
                        self.protocol_types.join(", ")
                    ))),
                    Err(e) => Err(e),
                }
            }
            ConsoleCommand::Disconnect => {
                self.disconnect().await?;
                Ok(CommandOutcome::Done)
            }
            ConsoleCommand::Organize(positions) => {
                self.organize_by_positions(&positions)?;
                Ok(CommandOutcome::Message(self.menu.render()))
            }
            ConsoleCommand::Font(size) => {
                self.set_font_size(size)?;
                Ok(CommandOutcome::Done)
            }
            ConsoleCommand::Color(target, color) => {
                self.set_color(target, color)?;
                Ok(CommandOutcome::Done)
            }
            ConsoleCommand::FKeys(enabled) => {
                self.set_fkey_bar(enabled)?;
                Ok(CommandOutcome::Done)
            }
            ConsoleCommand::ClearPrefs => {
                self.clear_saved_preferences()?;
                Ok(CommandOutcome::Message("Saved preferences cleared".to_string()))
            }
            ConsoleCommand::Status => {
                let snapshot = self.status().await?;
                let mut text = snapshot.state.to_string();
                if let Some(at) = snapshot.connected_at {
                    text.push_str(&format!(" since {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
                }
                Ok(CommandOutcome::Message(text))
            }
            ConsoleCommand::About => Ok(CommandOutcome::Message(self.about())),
            ConsoleCommand::Help => Ok(CommandOutcome::Message(HELP.to_string())),
            ConsoleCommand::Quit => Ok(CommandOutcome::Exit {
                terminate_process: self.exit().await?,
            }),
        }
    }

    fn persist_favourites(&mut self) {
        if let Err(e) = self.favourites.persist(&mut self.prefs, self.hosts.hosts()) {
            warn!("{}", e);
        }
    }

    fn rebuild_menu(&mut self) {
        self.menu = HostMenu::build(self.hosts.hosts());
    }

    fn push_preferences(&self) -> Result<()> {
        self.connection.apply_preferences(self.preferences.clone())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn hosts(&self) -> &HostRegistry {
        &self.hosts
    }

    pub fn menu(&self) -> &HostMenu {
        &self.menu
    }

    pub fn preferences(&self) -> &DisplayPreferences {
        &self.preferences
    }

    /// Protocol tags a new host can use
    pub fn protocol_types(&self) -> &[String] {
        &self.protocol_types
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }
}
