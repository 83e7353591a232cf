//! Twinfall native host
//!
//! Headless driver for the simulation core: runs the fixed-timestep
//! accumulator loop over the bundled demo levels (or a level file given
//! on the command line) with a scripted autopilot on both pads, prints
//! an ASCII view once a second, and reacts to level events the way a
//! real front end would - respawn on death, advance on completion.

use twinfall::consts::{MAX_SUBSTEPS, SIM_DT};
use twinfall::map::Map;
use twinfall::sim::{Behavior, Level, LevelEvent, PadInput, TickInput};
use twinfall::tuning::Tuning;

/// Synthetic frame cadence for the headless loop
const FRAME_DT: f32 = 1.0 / 60.0;
/// Wall on total simulated time so a stuck autopilot still terminates
const MAX_SIM_SECONDS: f32 = 90.0;
/// Seconds between autopilot jump presses
const JUMP_PERIOD: f32 = 0.9;

const DEMO_MEADOW: &str = r#####################################################"{
    "name": "meadow",
    "next": "gauntlet",
    "caption": "two worlds, one way out",
    "rows": [
        "########################################",
        "#I............o...............o........#",
        "#......................................#",
        "#F.....o...#.....o....#......o.......E.#",
        "########################################"
    ]
}"#####################################################;

const DEMO_GAUNTLET: &str = r#####################################################"{
    "name": "gauntlet",
    "caption": "mind the locals",
    "rows": [
        "########################################",
        "#I.............o.......................#",
        "#..........b...........................#",
        "#......................................#",
        "#...l..................................#",
        "#......................................#",
        "#F..L.....w......^^.....o...........E..#",
        "########################################"
    ]
}"#####################################################;

const DEMOS: &[(&str, &str)] = &[("meadow", DEMO_MEADOW), ("gauntlet", DEMO_GAUNTLET)];

fn find_demo(name: &str) -> Option<&'static str> {
    DEMOS
        .iter()
        .find(|(demo_name, _)| *demo_name == name)
        .map(|(_, json)| *json)
}

struct Host {
    level: Level,
    map: Map,
    tuning: Tuning,
    total_coins: u32,
    total_deaths: u32,
    jump_period: u32,
}

impl Host {
    fn new(map: Map, tuning: Tuning) -> Self {
        if let Some(caption) = map.caption() {
            log::info!("\"{caption}\"");
        }
        let level = Level::new(&map, tuning.clone());
        Self {
            level,
            map,
            tuning,
            total_coins: 0,
            total_deaths: 0,
            jump_period: 0,
        }
    }

    fn load(&mut self, map: Map) {
        if let Some(caption) = map.caption() {
            log::info!("\"{caption}\"");
        }
        self.level = Level::new(&map, self.tuning.clone());
        self.map = map;
    }

    fn restart(&mut self) {
        self.level = Level::new(&self.map, self.tuning.clone());
    }

    /// Scripted input: both players push right and hop on a timer
    fn autopilot(&mut self, sim_time: f32) -> TickInput {
        let period = (sim_time / JUMP_PERIOD) as u32;
        let jump = period != self.jump_period;
        self.jump_period = period;

        let pad = PadInput {
            left: false,
            right: true,
            jump_pressed: jump,
        };
        TickInput { pads: [pad, pad] }
    }
}

fn main() {
    env_logger::init();

    let tuning = Tuning::default();
    let map = match std::env::args().nth(1) {
        Some(path) => match Map::load(&path) {
            Ok(map) => map,
            Err(err) => {
                log::error!("failed to load '{path}': {err}");
                std::process::exit(1);
            }
        },
        None => Map::parse(DEMO_MEADOW).expect("bundled demo level is valid"),
    };

    log::info!("twinfall starting on '{}'", map.name());
    let mut host = Host::new(map, tuning);

    let mut accumulator = 0.0f32;
    let mut sim_time = 0.0f32;
    let mut frame = 0u64;
    let mut done = false;

    while !done && sim_time < MAX_SIM_SECONDS {
        // Fixed-timestep accumulator: simulate in whole steps, carry
        // the remainder into the next frame
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = host.autopilot(sim_time);
            host.level.update(&input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
            sim_time += SIM_DT;
        }

        for event in host.level.drain_events() {
            match event {
                LevelEvent::CoinCollected { total } => {
                    log::info!("coin collected ({total} this level)");
                }
                LevelEvent::PlayersDied => {
                    host.total_deaths += 1;
                    log::info!("restarting '{}' (death #{})", host.map.name(), host.total_deaths);
                    host.restart();
                }
                LevelEvent::LevelComplete { next_map } => {
                    host.total_coins += host.level.coin_count();
                    match next_map.as_deref().and_then(find_demo) {
                        Some(json) => {
                            let map = Map::parse(json).expect("bundled demo level is valid");
                            log::info!("advancing to '{}'", map.name());
                            host.load(map);
                        }
                        None => {
                            done = true;
                        }
                    }
                }
            }
        }

        frame += 1;
        if frame % 60 == 0 {
            print!("{}", render_ascii(&host));
        }
    }

    println!(
        "run over: {} coins banked, {} deaths, {:.1}s simulated",
        host.total_coins, host.total_deaths, sim_time
    );
}

/// Draw the whole map top-down with entities overlaid, plus a camera
/// status line. Read-only: this is the renderer contract in miniature.
fn render_ascii(host: &Host) -> String {
    let bounds = host.map.boundaries();
    let (w, h) = (bounds.w as usize, bounds.h as usize);
    let mut grid = vec![vec!['.'; w]; h];

    for r in host.map.solids() {
        stamp(&mut grid, r.x, r.y, r.w, r.h, '#');
    }
    for r in host.map.spikes() {
        stamp(&mut grid, r.x, r.y, r.w, r.h, '^');
    }
    for r in host.map.portals() {
        stamp(&mut grid, r.x, r.y, r.w, r.h, 'P');
    }
    for r in host.map.exits() {
        stamp(&mut grid, r.x, r.y, r.w, r.h, 'E');
    }

    for entity in host.level.entities() {
        let glyph = match &entity.behavior {
            Behavior::Coin => 'o',
            Behavior::Walker(_) => 'w',
            Behavior::Bat(_) => 'b',
            Behavior::LinkedHead(_) => 'M',
            Behavior::Player(_) => '?',
        };
        plot(&mut grid, entity.rect.center().x, entity.rect.center().y, glyph);

        if let Behavior::LinkedHead(head) = &entity.behavior {
            let part = host.level.world().rect(head.kill_shape());
            plot(&mut grid, part.center().x, part.center().y, 'M');
        }
    }

    let glyphs = ['F', 'I'];
    for (player, glyph) in host.level.players().iter().zip(glyphs) {
        plot(&mut grid, player.rect.center().x, player.rect.center().y, glyph);
    }

    let mut out = String::new();
    for row in grid.iter().rev() {
        out.extend(row.iter());
        out.push('\n');
    }
    let cam = host.level.camera();
    out.push_str(&format!(
        "cam ({:.1}, {:.1}) zoom {:.2} | coins {} | deaths {}\n\n",
        cam.center.x,
        cam.center.y,
        cam.zoom,
        host.level.coin_count(),
        host.total_deaths
    ));
    out
}

fn stamp(grid: &mut [Vec<char>], x: f32, y: f32, w: f32, h: f32, glyph: char) {
    for ty in y as usize..(y + h).ceil() as usize {
        for tx in x as usize..(x + w).ceil() as usize {
            if let Some(cell) = grid.get_mut(ty).and_then(|row| row.get_mut(tx)) {
                *cell = glyph;
            }
        }
    }
}

fn plot(grid: &mut [Vec<char>], x: f32, y: f32, glyph: char) {
    let (tx, ty) = (x.floor() as isize, y.floor() as isize);
    if tx < 0 || ty < 0 {
        return;
    }
    if let Some(cell) = grid
        .get_mut(ty as usize)
        .and_then(|row| row.get_mut(tx as usize))
    {
        *cell = glyph;
    }
}
