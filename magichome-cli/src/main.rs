use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use magichome_client::args::ConnectionArgs;
use magichome_client::{Config, DeviceClient, DeviceClientBuilder};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "magichome")]
#[command(author, version, about = "Control MagicHome RGB(W) LED controllers", long_about = None)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Verbose logging level (repeat for more verbosity: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Hex-dump every frame sent to the device
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Switch the device on or off
    Power {
        #[arg(value_enum)]
        state: PowerState,
    },

    /// Set red, green, blue and optional white levels (0-255)
    Rgb {
        r: u8,
        g: u8,
        b: u8,
        #[arg(default_value_t = 0)]
        w: u8,
    },

    /// Set a color as hue (0-359), saturation (0-100) and value (0-100)
    Hsv { h: f64, s: f64, v: f64 },

    /// Sweep the hue around the color wheel until interrupted
    Cycle {
        /// Delay between color changes in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Hue increment per step in degrees
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..360))]
        step: u32,

        /// Saturation in percent
        #[arg(long, default_value_t = 100.0)]
        saturation: f64,

        /// Value in percent
        #[arg(long, default_value_t = 100.0)]
        value: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PowerState {
    On,
    Off,
}

fn init_logging(level: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn next_hue(hue: u32, step: u32) -> u32 {
    (hue + step) % 360
}

async fn run_cycle(
    device: &DeviceClient,
    interval: Duration,
    step: u32,
    saturation: f64,
    value: f64,
) -> Result<()> {
    device
        .set_power(true)
        .await
        .context("Failed to switch device on")?;

    let mut ticker = tokio::time::interval(interval);
    let mut hue = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = device.set_color_hsv(f64::from(hue), saturation, value).await {
                    warn!("Failed to set hue {}: {}", hue, e);
                }
                hue = next_hue(hue, step);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping cycle");
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);
    if args.trace {
        magichome_client::set_wire_trace(true);
    }

    let config = Config::from_args(&args.connection).context("Invalid device configuration")?;
    info!(
        "Using device {} (order {})",
        config.address(),
        config.device.channel_order
    );

    let device = DeviceClientBuilder::new(config).build()?;

    match args.command {
        Command::Power { state } => {
            device.set_power(state == PowerState::On).await?;
        }
        Command::Rgb { r, g, b, w } => {
            device.set_color_rgbw(r, g, b, w).await?;
        }
        Command::Hsv { h, s, v } => {
            device.set_color_hsv(h, s, v).await?;
        }
        Command::Cycle {
            interval_ms,
            step,
            saturation,
            value,
        } => {
            run_cycle(
                &device,
                Duration::from_millis(interval_ms),
                step,
                saturation,
                value,
            )
            .await?;
        }
    }

    device.disconnect().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_hue_wraps() {
        assert_eq!(next_hue(0, 1), 1);
        assert_eq!(next_hue(359, 1), 0);
        assert_eq!(next_hue(350, 15), 5);
    }

    #[test]
    fn test_parse_power() {
        let args = Args::try_parse_from(["magichome", "10.0.0.2", "power", "on"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Power {
                state: PowerState::On
            }
        ));
    }

    #[test]
    fn test_parse_rgb_default_white() {
        let args = Args::try_parse_from(["magichome", "10.0.0.2", "rgb", "1", "2", "3"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Rgb {
                r: 1,
                g: 2,
                b: 3,
                w: 0
            }
        ));
    }

    #[test]
    fn test_parse_rgb_rejects_out_of_range() {
        assert!(Args::try_parse_from(["magichome", "10.0.0.2", "rgb", "256", "0", "0"]).is_err());
    }

    #[test]
    fn test_parse_cycle_defaults() {
        let args = Args::try_parse_from(["magichome", "10.0.0.2", "cycle"]).unwrap();
        match args.command {
            Command::Cycle {
                interval_ms, step, ..
            } => {
                assert_eq!(interval_ms, 100);
                assert_eq!(step, 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["magichome", "10.0.0.2", "hsv", "120", "100", "100", "-vv"])
                .unwrap();
        assert_eq!(args.verbose, 2);
    }
}
