use mwpe::descriptor::DeviceId;
use mwpe::simulation::Simulation;

fn print_catalog() {
    for id in DeviceId::ALL {
        println!("{:<12} {}", id.as_str(), id.name());
    }
}

/// `1600x900` style window size argument.
fn parse_size(arg: &str) -> Option<(u32, u32)> {
    let (w, h) = arg.split_once('x')?;
    match (w.parse::<u32>(), h.parse::<u32>()) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Some((w, h)),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut device = DeviceId::default();
    let mut size: Option<(u32, u32)> = None;
    let mut overrides: Vec<(String, f64)> = Vec::new();

    for arg in std::env::args().skip(1) {
        if arg == "--list" || arg == "-l" {
            print_catalog();
            return;
        }
        // `Vo=12.5` style input overrides, anything else is a device id.
        if let Some((key, value)) = arg.split_once('=') {
            match value.parse::<f64>() {
                Ok(v) => overrides.push((key.to_string(), v)),
                Err(_) => {
                    eprintln!("invalid parameter override '{}'", arg);
                    std::process::exit(1);
                }
            }
            continue;
        }
        if let Some(dims) = parse_size(&arg) {
            size = Some(dims);
            continue;
        }
        match DeviceId::parse(&arg) {
            Some(id) => device = id,
            None => {
                eprintln!("unknown device '{}', available devices:", arg);
                print_catalog();
                std::process::exit(1);
            }
        }
    }

    let mut sim = Simulation::new(device);
    for (key, value) in &overrides {
        sim.set_input(key, *value);
    }

    let result = match size {
        Some(dims) => mwpe::window::run_sized(sim, dims),
        None => mwpe::window::run(sim),
    };
    if let Err(e) = result {
        eprintln!("viewer error: {}", e);
        std::process::exit(1);
    }
}
