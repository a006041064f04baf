//! Sweep a device once around the color wheel.
//!
//! Usage:
//!   cargo run --example rainbow -- 192.168.2.61 [rgb|grb|brg]
//!
//! Set `MAGICHOME_TRACE=1` to log every frame sent.

use magichome_client::{ChannelOrder, Config, DeviceClientBuilder};
use std::env;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <host> [rgb|grb|brg]", args[0]);
        std::process::exit(1);
    }

    let order: ChannelOrder = match args.get(2) {
        Some(order) => order.parse()?,
        None => ChannelOrder::default(),
    };

    let config = Config::builder()
        .host(args[1].as_str())
        .channel_order(order)
        .build()?;
    let device = DeviceClientBuilder::new(config).build()?;
    info!("Sweeping {} ({})", device.host(), order);

    device.set_power(true).await?;
    for hue in (0..360).step_by(5) {
        if let Err(e) = device.set_color_hsv(f64::from(hue), 100.0, 100.0).await {
            warn!("Hue {} failed: {}", hue, e);
        }
        sleep(Duration::from_millis(50)).await;
    }

    device.set_color_rgbw(0, 0, 0, 255).await?;
    device.disconnect().await;
    info!("Done");
    Ok(())
}
