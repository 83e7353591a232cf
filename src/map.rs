//! Level maps
//!
//! A level file is JSON with a header and an ASCII tile grid, one
//! character per tile:
//!
//! ```text
//! #  solid terrain        F  fire player spawn   I  ice player spawn
//! o  coin                 ^  spike               P  gravity portal
//! E  level exit           w  walker              W  ceiling walker
//! b  bat                  L  linked enemy head   l  linked kill part
//! .  empty (space works too)
//! ```
//!
//! Parsing validates the spawn set up front - a missing or duplicated
//! player spawn, or an unpaired linked enemy, fails the load rather
//! than producing a broken level.

use std::path::Path;

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

use crate::sim::rect::Rect;

/// World units per grid cell
pub const TILE_SIZE: f32 = 1.0;

/// Background tints for the mirrored halves of the world
const DEFAULT_TOP_COLOR: [f32; 3] = [0.16, 0.20, 0.35];
const DEFAULT_BOTTOM_COLOR: [f32; 3] = [0.35, 0.16, 0.16];

/// On-disk level format
#[derive(Debug, Deserialize)]
struct LevelFile {
    name: String,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    top_color: Option<[f32; 3]>,
    #[serde(default)]
    bottom_color: Option<[f32; 3]>,
    rows: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("could not read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level file: {0}")]
    Format(#[from] serde_json::Error),
    #[error("level '{name}' has no rows")]
    Empty { name: String },
    #[error("unknown tile '{tile}' at column {col}, row {row}")]
    UnknownTile { tile: char, col: usize, row: usize },
    #[error("level '{name}' is missing the {color} player spawn")]
    MissingPlayerSpawn { name: String, color: &'static str },
    #[error("level '{name}' has more than one {color} player spawn")]
    DuplicatePlayerSpawn { name: String, color: &'static str },
    #[error("linked enemy head in column {col} has no kill part in its column")]
    UnpairedLinkedHead { col: usize },
    #[error("kill part in column {col} has no linked enemy head in its column")]
    UnpairedKillPart { col: usize },
}

/// A dynamic entity the level should create
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnKind {
    Coin,
    Walker { inverted_gravity: bool },
    Bat,
    LinkedHead { kill_y: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct Spawn {
    pub kind: SpawnKind,
    pub pos: Vec2,
}

/// Parsed, validated map data
#[derive(Debug, Clone)]
pub struct Map {
    name: String,
    next: Option<String>,
    caption: Option<String>,
    top_color: [f32; 3],
    bottom_color: [f32; 3],
    width: usize,
    height: usize,
    fire_spawn: Vec2,
    ice_spawn: Vec2,
    solids: Vec<Rect>,
    spikes: Vec<Rect>,
    portals: Vec<Rect>,
    exits: Vec<Rect>,
    spawns: Vec<Spawn>,
}

impl Map {
    /// Load and parse a level file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json)
    }

    /// Parse a level file from a JSON string
    pub fn parse(json: &str) -> Result<Self, MapError> {
        let file: LevelFile = serde_json::from_str(json)?;
        Self::build(file)
    }

    fn build(file: LevelFile) -> Result<Self, MapError> {
        if file.rows.is_empty() {
            return Err(MapError::Empty { name: file.name });
        }

        let height = file.rows.len();
        let width = file.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

        let mut fire_spawn = None;
        let mut ice_spawn = None;
        let mut solids = Vec::new();
        let mut spikes = Vec::new();
        let mut portals = Vec::new();
        let mut exits = Vec::new();
        let mut spawns = Vec::new();
        let mut heads: Vec<(usize, f32)> = Vec::new();
        let mut parts: Vec<(usize, f32)> = Vec::new();

        for (row_idx, row) in file.rows.iter().enumerate() {
            let y = (height - 1 - row_idx) as f32 * TILE_SIZE;
            // Merge runs of solid tiles into single shapes per row
            let mut run_start: Option<usize> = None;

            for (col, tile) in row.chars().enumerate() {
                let x = col as f32 * TILE_SIZE;

                if tile == '#' {
                    run_start.get_or_insert(col);
                    continue;
                }
                if let Some(start) = run_start.take() {
                    solids.push(run_rect(start, col, y));
                }

                match tile {
                    '.' | ' ' => {}
                    'F' => set_player_spawn(&mut fire_spawn, "fire", &file.name, x, y)?,
                    'I' => set_player_spawn(&mut ice_spawn, "ice", &file.name, x, y)?,
                    'o' => spawns.push(Spawn {
                        kind: SpawnKind::Coin,
                        pos: Vec2::new(x, y),
                    }),
                    '^' => spikes.push(Rect::new(x, y, TILE_SIZE, TILE_SIZE)),
                    'P' => portals.push(Rect::new(x, y, TILE_SIZE, TILE_SIZE)),
                    'E' => exits.push(Rect::new(x, y, TILE_SIZE, TILE_SIZE)),
                    'w' => spawns.push(Spawn {
                        kind: SpawnKind::Walker {
                            inverted_gravity: false,
                        },
                        pos: Vec2::new(x, y),
                    }),
                    'W' => spawns.push(Spawn {
                        kind: SpawnKind::Walker {
                            inverted_gravity: true,
                        },
                        pos: Vec2::new(x, y),
                    }),
                    'b' => spawns.push(Spawn {
                        kind: SpawnKind::Bat,
                        pos: Vec2::new(x, y),
                    }),
                    'L' => heads.push((col, y)),
                    'l' => parts.push((col, y)),
                    other => {
                        return Err(MapError::UnknownTile {
                            tile: other,
                            col,
                            row: row_idx,
                        });
                    }
                }
            }
            if let Some(start) = run_start.take() {
                solids.push(run_rect(start, row.chars().count(), y));
            }
        }

        // Pair each linked head with the kill part sharing its column
        for (col, y) in heads {
            let Some(idx) = parts.iter().position(|&(part_col, _)| part_col == col) else {
                return Err(MapError::UnpairedLinkedHead { col });
            };
            let (_, kill_y) = parts.remove(idx);
            spawns.push(Spawn {
                kind: SpawnKind::LinkedHead { kill_y },
                pos: Vec2::new(col as f32 * TILE_SIZE, y),
            });
        }
        if let Some(&(col, _)) = parts.first() {
            return Err(MapError::UnpairedKillPart { col });
        }

        let fire_spawn = fire_spawn.ok_or_else(|| MapError::MissingPlayerSpawn {
            name: file.name.clone(),
            color: "fire",
        })?;
        let ice_spawn = ice_spawn.ok_or_else(|| MapError::MissingPlayerSpawn {
            name: file.name.clone(),
            color: "ice",
        })?;

        log::debug!(
            "parsed level '{}': {}x{}, {} solids, {} spawns",
            file.name,
            width,
            height,
            solids.len(),
            spawns.len()
        );

        Ok(Self {
            name: file.name,
            next: file.next,
            caption: file.caption,
            top_color: file.top_color.unwrap_or(DEFAULT_TOP_COLOR),
            bottom_color: file.bottom_color.unwrap_or(DEFAULT_BOTTOM_COLOR),
            width,
            height,
            fire_spawn,
            ice_spawn,
            solids,
            spikes,
            portals,
            exits,
            spawns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the level to load after this one, if any
    pub fn next_level(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Flavor text shown by the host when the level starts
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn top_color(&self) -> [f32; 3] {
        self.top_color
    }

    pub fn bottom_color(&self) -> [f32; 3] {
        self.bottom_color
    }

    /// The rectangle the camera must stay inside
    pub fn boundaries(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }

    pub fn fire_spawn(&self) -> Vec2 {
        self.fire_spawn
    }

    pub fn ice_spawn(&self) -> Vec2 {
        self.ice_spawn
    }

    pub fn solids(&self) -> &[Rect] {
        &self.solids
    }

    pub fn spikes(&self) -> &[Rect] {
        &self.spikes
    }

    pub fn portals(&self) -> &[Rect] {
        &self.portals
    }

    pub fn exits(&self) -> &[Rect] {
        &self.exits
    }

    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }
}

fn run_rect(start: usize, end: usize, y: f32) -> Rect {
    Rect::new(
        start as f32 * TILE_SIZE,
        y,
        (end - start) as f32 * TILE_SIZE,
        TILE_SIZE,
    )
}

fn set_player_spawn(
    slot: &mut Option<Vec2>,
    color: &'static str,
    level_name: &str,
    x: f32,
    y: f32,
) -> Result<(), MapError> {
    if slot.is_some() {
        return Err(MapError::DuplicatePlayerSpawn {
            name: level_name.to_owned(),
            color,
        });
    }
    *slot = Some(Vec2::new(x, y));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gathers_geometry_and_spawns() {
        let map = Map::parse(
            r#########"{
                "name": "demo",
                "next": "demo2",
                "rows": [
                    "########",
                    "#F.o..I#",
                    "#..^...#",
                    "########"
                ]
            }"#########,
        )
        .unwrap();

        assert_eq!(map.name(), "demo");
        assert_eq!(map.next_level(), Some("demo2"));
        assert_eq!(map.boundaries(), Rect::new(0.0, 0.0, 8.0, 4.0));
        assert_eq!(map.fire_spawn(), Vec2::new(1.0, 2.0));
        assert_eq!(map.ice_spawn(), Vec2::new(6.0, 2.0));
        assert_eq!(map.spikes().len(), 1);
        assert_eq!(map.spawns().len(), 1); // the coin
    }

    #[test]
    fn test_solid_runs_merge_per_row() {
        let map = Map::parse(
            r#########"{
                "name": "runs",
                "rows": [
                    "####.##",
                    "F.....I",
                    "#######"
                ]
            }"#########,
        )
        .unwrap();

        // Top row splits into two runs, bottom row is one
        assert_eq!(map.solids().len(), 3);
        assert!(map.solids().contains(&Rect::new(0.0, 2.0, 4.0, 1.0)));
        assert!(map.solids().contains(&Rect::new(5.0, 2.0, 2.0, 1.0)));
        assert!(map.solids().contains(&Rect::new(0.0, 0.0, 7.0, 1.0)));
    }

    #[test]
    fn test_unknown_tile_fails() {
        let err = Map::parse(r#"{ "name": "x", "rows": ["F?I"] }"#).unwrap_err();
        assert!(matches!(
            err,
            MapError::UnknownTile { tile: '?', col: 1, row: 0 }
        ));
    }

    #[test]
    fn test_missing_player_spawn_fails() {
        let err = Map::parse(r#"{ "name": "x", "rows": ["F.."] }"#).unwrap_err();
        assert!(matches!(
            err,
            MapError::MissingPlayerSpawn { color: "ice", .. }
        ));
    }

    #[test]
    fn test_duplicate_player_spawn_fails() {
        let err = Map::parse(r#"{ "name": "x", "rows": ["FFI"] }"#).unwrap_err();
        assert!(matches!(
            err,
            MapError::DuplicatePlayerSpawn { color: "fire", .. }
        ));
    }

    #[test]
    fn test_linked_pairing_by_column() {
        let map = Map::parse(
            r#########"{
                "name": "linked",
                "rows": [
                    "#####",
                    "#.l.#",
                    "#...#",
                    "#.L.#",
                    "#F.I#",
                    "#####"
                ]
            }"#########,
        )
        .unwrap();

        let head = map
            .spawns()
            .iter()
            .find(|s| matches!(s.kind, SpawnKind::LinkedHead { .. }))
            .unwrap();
        assert_eq!(head.pos, Vec2::new(2.0, 2.0));
        assert_eq!(head.kind, SpawnKind::LinkedHead { kill_y: 4.0 });
    }

    #[test]
    fn test_unpaired_linked_head_fails() {
        let err = Map::parse(r#"{ "name": "x", "rows": ["FLI"] }"#).unwrap_err();
        assert!(matches!(err, MapError::UnpairedLinkedHead { col: 1 }));
    }

    #[test]
    fn test_unpaired_kill_part_fails() {
        let err = Map::parse(r#"{ "name": "x", "rows": ["FlI"] }"#).unwrap_err();
        assert!(matches!(err, MapError::UnpairedKillPart { col: 1 }));
    }

    #[test]
    fn test_empty_rows_fail() {
        let err = Map::parse(r#"{ "name": "void", "rows": [] }"#).unwrap_err();
        assert!(matches!(err, MapError::Empty { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Map::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
    }
}
