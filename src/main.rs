//! Pachinko Planes headless driver
//!
//! Scatters a few seeded planes, then runs the frame loop at a jittery 60 Hz
//! and reports what the balls did.
//!
//! Usage: `pachinko-planes [settings.json] [seconds] [seed]`

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pachinko_planes::audio::LogToneSink;
use pachinko_planes::renderer::{CountingSink, Vertex, arena_border, guideline_strip, plane_lines};
use pachinko_planes::{Playground, Settings};

const DEFAULT_SECONDS: f64 = 30.0;
const DEFAULT_SEED: u64 = 12345;
const PLANE_COUNT: usize = 12;
const FRAME_MS: f64 = 1000.0 / 60.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match args.first() {
        Some(path) if path != "-" => Settings::load(path),
        _ => Settings::default(),
    };
    let seconds = args
        .get(1)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(DEFAULT_SECONDS);
    let seed = args
        .get(2)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SEED);

    log::info!("Pachinko Planes (headless) starting, seed {}", seed);
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut playground = Playground::new(settings);

    let half = playground.settings().half_extents();
    for _ in 0..PLANE_COUNT {
        let start = Vec2::new(
            rng.random_range(-half.x..half.x),
            rng.random_range(-half.y..half.y),
        );
        let end = start
            + Vec2::new(
                rng.random_range(-1.5f32..1.5),
                rng.random_range(-0.75f32..0.75),
            );
        playground.add_plane(start, end);
    }
    log::info!("Drew {} planes", playground.planes().active_len());

    let mut tones = LogToneSink::default();
    let mut uploads = CountingSink::default();
    let mut elapsed = 0.0;
    let mut drops = 0u64;
    let mut ticks = 0u64;
    let mut bounces = 0u64;

    while elapsed < seconds * 1000.0 {
        let delta = FRAME_MS * rng.random_range(0.8..1.2);
        let stats = playground.frame(delta, &mut tones, &mut uploads);
        elapsed += delta;
        drops += stats.dropped.is_some() as u64;
        ticks += stats.ticks as u64;
        bounces += stats.bounces as u64;
    }

    let guideline = playground.guideline();
    log::info!(
        "Guideline: {} of {} points simulated",
        guideline.simulated_len(),
        guideline.capacity()
    );

    // Static geometry a host would draw alongside the ball instances
    let lines = plane_lines(playground.planes());
    let strip = guideline_strip(guideline);
    let border = arena_border(playground.settings());
    let geometry_bytes: usize = [lines.as_slice(), strip.as_slice(), border.as_slice()]
        .iter()
        .map(|v| bytemuck::cast_slice::<Vertex, u8>(v).len())
        .sum();
    log::info!(
        "Scene geometry: {} plane vertices, {} guideline vertices, {} border vertices ({} bytes)",
        lines.len(),
        strip.len(),
        border.len(),
        geometry_bytes
    );
    println!(
        "{:.1}s simulated: {} drops, {} ticks, {} bounces, {} tones, {} position / {} color uploads ({} bytes)",
        elapsed / 1000.0,
        drops,
        ticks,
        bounces,
        tones.played,
        uploads.position_uploads,
        uploads.color_uploads,
        uploads.bytes
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless driver is native only
}
