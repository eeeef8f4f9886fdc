//! openterm - console front end
//!
//! Reads menu actions from stdin and prints titles and connection notices.
//! All logic lives in the library.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use openterm::app::Started;
use openterm::{
    Application, CommandOutcome, ConnectionEvent, ConsoleCommand, Error, FilePreferenceStore,
    HeadlessDisplay, Host, TerminalFactoryRegistry,
};

/// openterm - remote terminal client
#[derive(Parser, Debug)]
#[command(name = "openterm", version)]
#[command(about = "Connect to remote terminal hosts and manage favourites", long_about = None)]
struct Args {
    /// Host to add at startup
    #[arg(long, value_name = "NAME")]
    host: Option<String>,

    /// Port of the startup host (defaults to the configured port)
    #[arg(long, requires = "host")]
    port: Option<u16>,

    /// Protocol type of the startup host (defaults to the configured type)
    #[arg(long = "type", value_name = "TYPE", requires = "host")]
    protocol_type: Option<String>,

    /// Use encryption for the startup host
    #[arg(long, requires = "host")]
    tls: bool,

    /// Remember the startup host as a favourite
    #[arg(long, requires = "host")]
    favourite: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Do not exit the process on quit
    #[arg(long)]
    embedded: bool,
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_event(event: ConnectionEvent) {
    match event {
        ConnectionEvent::TitleChanged(title) => println!("== {} ==", title),
        ConnectionEvent::ConnectionFailed { message, .. } => {
            println!("Failed to connect to the server:\n{}", message)
        }
        ConnectionEvent::StateChanged(state) => debug!("Connection state: {}", state.name()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let (mut config, prefs_path) =
        openterm::init(args.config.as_deref()).context("Failed to load configuration")?;
    if args.embedded {
        config.embedded = true;
    }

    let startup_host = match &args.host {
        Some(name) => Some(
            Host::new(
                name.as_str(),
                args.port.unwrap_or(config.default_port),
                args.protocol_type
                    .clone()
                    .unwrap_or_else(|| config.default_protocol.clone()),
                args.tls,
            )
            .context("Invalid startup host")?
            .with_favourite(args.favourite),
        ),
        None => None,
    };

    let factories = Arc::new(TerminalFactoryRegistry::with_builtin_terminals(
        config.connect_timeout(),
    ));
    let prefs = FilePreferenceStore::open(prefs_path);

    let Started {
        mut app,
        mut events,
        actor,
    } = Application::start(config, prefs, factories, HeadlessDisplay::new(), startup_host);

    println!("== {} ==", app.status().await?.title);
    println!("{}", app.menu().render());
    println!("Type 'help' for commands.");

    if app.auto_connect().await.is_some() {
        while let Ok(event) = events.try_recv() {
            print_event(event);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let terminate_process = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    info!("Input closed");
                    break app.exit().await?;
                };

                let command = match ConsoleCommand::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                match app.handle_command(command).await {
                    Ok(CommandOutcome::Done) => {}
                    Ok(CommandOutcome::Message(text)) => println!("{}", text),
                    Ok(CommandOutcome::Exit { terminate_process }) => break terminate_process,
                    // Shown through the failure notice event
                    Err(e) if e.is_unknown_protocol() || matches!(e, Error::ConnectionFailed { .. }) => {}
                    Err(e) => println!("{}", e.user_message()),
                }

                while let Ok(event) = events.try_recv() {
                    print_event(event);
                }
            }
            Some(event) = events.recv() => print_event(event),
        }
    };

    while let Ok(event) = events.try_recv() {
        print_event(event);
    }
    drop(app);
    if let Err(e) = actor.await {
        warn!("Connection actor ended abnormally: {}", e);
    }

    if terminate_process {
        info!("openterm shutdown complete");
    } else {
        info!("Leaving process running for the embedding application");
    }
    Ok(())
}
