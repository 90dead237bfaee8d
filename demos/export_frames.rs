//! Exports a numbered frame sequence for one device, ready for ffmpeg.
//!
//! Usage: `cargo run --release --example export_frames [device] [frames]`
//!
//! Then e.g.:
//! `ffmpeg -framerate 60 -i frames/magnetron-%04d.png -pix_fmt yuv420p magnetron.mp4`

use mwpe::time::FrameClock;
use mwpe::{DeviceId, ExportError, Simulation};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn main() -> Result<(), ExportError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let device = args
        .next()
        .and_then(|s| DeviceId::parse(&s))
        .unwrap_or(DeviceId::Magnetron);
    let frames: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    std::fs::create_dir_all("frames")?;

    let mut sim = Simulation::new(device).with_seed(42);
    let mut clock = FrameClock::new();

    // Let the pool fill before capturing.
    for _ in 0..120 {
        sim.tick(WIDTH, HEIGHT);
    }

    for i in 0..frames {
        sim.tick(WIDTH, HEIGHT);
        clock.tick();
        sim.canvas()
            .save_png(format!("frames/{}-{:04}.png", device.as_str(), i))?;
    }

    log::info!(
        "{}: {} frames in {:.1}s ({:.1} fps incl. PNG encode)",
        device.name(),
        frames,
        clock.elapsed_secs(),
        frames as f32 / clock.elapsed_secs().max(1e-6)
    );

    Ok(())
}
