//! Command-line argument parsing for device client applications.
//!
//! This module is only available when the `cli` feature is enabled.
//! [`ConnectionArgs`] is meant to be flattened into an application's own
//! `clap` parser and converted into a [`Config`].
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use magichome_client::args::ConnectionArgs;
//! use magichome_client::Config;
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     connection: ConnectionArgs,
//! }
//!
//! let cli = Cli::parse();
//! let config = Config::from_args(&cli.connection)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::Config;
use crate::errors::MagicHomeError;
use magichome_protocol::ChannelOrder;

/// Connection arguments shared by device client applications.
#[derive(clap::Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Device address (host or host:port)
    ///
    /// Examples:
    ///   - 192.168.2.61
    ///   - 192.168.2.61:5577
    ///   - lamp.local
    #[arg(value_name = "DEVICE", env = "MAGICHOME_DEVICE")]
    pub device: String,

    /// Device port (overrides port in DEVICE if specified)
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Channel order of the strip: rgb, grb or brg
    #[arg(short = 'o', long, value_name = "ORDER")]
    pub order: Option<ChannelOrder>,

    /// Close the connection after every command
    #[arg(long)]
    pub close_after_send: bool,

    /// Configuration file path (TOML format)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<String>,
}

impl Config {
    /// Create a configuration from command-line arguments.
    ///
    /// If a config file is specified in the arguments, it is loaded first,
    /// then overridden by explicit command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The device address is invalid
    /// - The configuration validation fails
    pub fn from_args(args: &ConnectionArgs) -> Result<Self, MagicHomeError> {
        let mut config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        let (host, port) = parse_device_address(&args.device)?;
        config.connection.host = host;

        if let Some(p) = args.port.or(port) {
            config.connection.port = p;
        }

        if let Some(order) = args.order {
            config.device.channel_order = order;
        }

        if args.close_after_send {
            config.device.close_after_send = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a device address in the format "host" or "host:port".
fn parse_device_address(device: &str) -> Result<(String, Option<u16>), MagicHomeError> {
    match device.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                MagicHomeError::Config(format!("Invalid port number: {}", port))
            })?;
            Ok((host.to_string(), Some(port)))
        }
        None => Ok((device.to_string(), None)),
    }
}
