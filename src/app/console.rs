//! Console command parsing
//!
//! The line-oriented front end maps each input line onto one of the
//! application's menu actions.

use crate::display::{ColorTarget, NamedColor};
use crate::error::{Error, Result};

pub const HELP: &str = "\
Commands:
  hosts                                   list known hosts
  connect <n>                             connect to host n
  new <host> <port> [type] [--tls] [--fav]  connect to a new host
  disconnect                              close the current session
  organize <n,...>                        keep only the listed favourites, in that order
  font <size>                             change font size
  color <fg|bold|bg> <name>               change a colour
  fkeys <on|off>                          show or hide the F-key bar
  clear-prefs                             forget saved preferences
  status                                  show connection status
  about                                   show version information
  quit                                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Hosts,
    /// Zero-based registry position
    Connect(usize),
    New {
        host: String,
        port: u16,
        protocol_type: Option<String>,
        encryption: bool,
        favourite: bool,
    },
    Disconnect,
    /// Zero-based registry positions, in the new order
    Organize(Vec<usize>),
    Font(u32),
    Color(ColorTarget, NamedColor),
    FKeys(bool),
    ClearPrefs,
    Status,
    About,
    Help,
    Quit,
}

fn invalid(command: &str, reason: impl Into<String>) -> Error {
    Error::InvalidCommand {
        command: command.to_string(),
        reason: reason.into(),
    }
}

/// Parse a 1-based position as shown in the host list
fn parse_position(command: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(invalid(command, format!("'{}' is not a host number", value))),
    }
}

impl ConsoleCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let parsed = match command.to_lowercase().as_str() {
            "hosts" | "list" => ConsoleCommand::Hosts,
            "connect" => {
                let [n] = args.as_slice() else {
                    return Err(invalid(command, "usage: connect <n>"));
                };
                ConsoleCommand::Connect(parse_position(command, n)?)
            }
            "new" => Self::parse_new(command, &args)?,
            "disconnect" => ConsoleCommand::Disconnect,
            "organize" | "organise" => {
                let positions = args
                    .join(",")
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| parse_position(command, s))
                    .collect::<Result<Vec<_>>>()?;
                ConsoleCommand::Organize(positions)
            }
            "font" => {
                let [size] = args.as_slice() else {
                    return Err(invalid(command, "usage: font <size>"));
                };
                let size = size
                    .parse::<u32>()
                    .map_err(|_| invalid(command, format!("'{}' is not a font size", size)))?;
                ConsoleCommand::Font(size)
            }
            "color" | "colour" => {
                let Some((target, name)) = args.split_first() else {
                    return Err(invalid(command, "usage: color <fg|bold|bg> <name>"));
                };
                if name.is_empty() {
                    return Err(invalid(command, "usage: color <fg|bold|bg> <name>"));
                }
                ConsoleCommand::Color(target.parse()?, name.join(" ").parse()?)
            }
            "fkeys" => match args.as_slice() {
                ["on"] => ConsoleCommand::FKeys(true),
                ["off"] => ConsoleCommand::FKeys(false),
                _ => return Err(invalid(command, "usage: fkeys <on|off>")),
            },
            "clear-prefs" => ConsoleCommand::ClearPrefs,
            "status" => ConsoleCommand::Status,
            "about" => ConsoleCommand::About,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            _ => return Err(invalid(command, "unknown command, try 'help'")),
        };

        Ok(Some(parsed))
    }

    fn parse_new(command: &str, args: &[&str]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut encryption = false;
        let mut favourite = false;

        for arg in args {
            match *arg {
                "--tls" => encryption = true,
                "--fav" | "--favourite" => favourite = true,
                flag if flag.starts_with("--") => {
                    return Err(invalid(command, format!("unknown option '{}'", flag)))
                }
                value => positional.push(value),
            }
        }

        let (host, port, protocol_type) = match positional.as_slice() {
            [host, port] => (host, port, None),
            [host, port, tag] => (host, port, Some(tag.to_string())),
            _ => {
                return Err(invalid(
                    command,
                    "usage: new <host> <port> [type] [--tls] [--fav]",
                ))
            }
        };

        let port = port
            .parse::<u16>()
            .map_err(|_| invalid(command, format!("'{}' is not a port", port)))?;

        Ok(ConsoleCommand::New {
            host: host.to_string(),
            port,
            protocol_type,
            encryption,
            favourite,
        })
    }
}
