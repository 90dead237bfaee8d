//! Renders every device headless and saves one PNG per device.
//!
//! Useful as a smoke test and for refreshing documentation shots.
//!
//! Usage: `cargo run --example all_devices [frames]`

use mwpe::{DeviceId, ExportError, Simulation};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn main() -> Result<(), ExportError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frames: u32 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(240);

    std::fs::create_dir_all("shots")?;

    for device in DeviceId::ALL {
        let mut sim = Simulation::new(device).with_seed(42);
        for _ in 0..frames {
            sim.tick(WIDTH, HEIGHT);
        }

        let path = format!("shots/{}.png", device.as_str());
        sim.canvas().save_png(&path)?;
        log::info!(
            "{:<28} {:>5} particles -> {}",
            device.name(),
            sim.particles().len(),
            path
        );
    }

    Ok(())
}
