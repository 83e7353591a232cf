//! Level state and the fixed-timestep simulation loop
//!
//! A level owns exactly one collision world, one entity list, one
//! camera and two players. Entity additions and removals requested
//! during a tick are deferred and drained once per frame - after all
//! entity updates, before the camera - so the live list is never
//! mutated while it is being iterated. Death and level completion latch
//! a `finished` flag exactly once; everything after that is a no-op.

use glam::Vec2;

use crate::map::{Map, SpawnKind};
use crate::tuning::Tuning;

use super::camera::Camera;
use super::entity::{Behavior, Entity, EntityId};
use super::enemy::{Bat, LinkedHead, Walker};
use super::filter::Category;
use super::player::{PlayerColor, PlayerState, PLAYER_HEIGHT, PLAYER_WIDTH};
use super::rect::Rect;
use super::world::World;

/// Camera settle iterations at level load, so the first rendered frame
/// does not snap
const CAMERA_WARMUP: u32 = 100;
const CAMERA_WARMUP_DT: f32 = 0.1;

/// How far outside the boundaries a player may fall before dying
const OUT_OF_BOUNDS_MARGIN: f32 = 4.0;

const COIN_SIZE: f32 = 0.6;
const ENEMY_SIZE: f32 = 0.9;

/// One player's input for a single tick, polled once per simulation step
#[derive(Debug, Clone, Copy, Default)]
pub struct PadInput {
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: true only on the tick the button went down
    pub jump_pressed: bool,
}

/// Input for both player slots
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub pads: [PadInput; 2],
}

/// What the level tells its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelEvent {
    CoinCollected { total: u32 },
    PlayersDied,
    LevelComplete { next_map: Option<String> },
}

/// Side effects gathered while entities update, applied after the pass
/// so nothing mutates the level mid-iteration.
#[derive(Debug, Default)]
pub struct Effects {
    coins: Vec<EntityId>,
    killed: bool,
    finished: bool,
}

impl Effects {
    /// Queue a coin pickup; a coin touched by both players in the same
    /// tick still counts once.
    pub fn collect_coin(&mut self, coin: EntityId) {
        if !self.coins.contains(&coin) {
            self.coins.push(coin);
        }
    }

    pub fn kill_players(&mut self) {
        self.killed = true;
    }

    pub fn finish_level(&mut self) {
        self.finished = true;
    }

    pub fn killed(&self) -> bool {
        self.killed
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    fn coins(&self) -> &[EntityId] {
        &self.coins
    }
}

pub struct Level {
    world: World,
    camera: Camera,
    players: [Entity; 2],
    entities: Vec<Entity>,
    to_add: Vec<Entity>,
    to_remove: Vec<EntityId>,
    events: Vec<LevelEvent>,
    boundaries: Rect,
    next_map: Option<String>,
    coins: u32,
    finished: bool,
    players_dead: bool,
    next_id: u32,
    tuning: Tuning,
}

impl Level {
    /// Build a level from parsed map data. The map loader has already
    /// validated the spawn set, so construction cannot fail.
    pub fn new(map: &Map, tuning: Tuning) -> Self {
        let mut world = World::new();
        let mut next_id = 0;

        let mut spawn_player = |world: &mut World, color: PlayerColor, pos: Vec2| {
            let id = EntityId::new(next_id);
            next_id += 1;
            let rect = Rect::new(pos.x, pos.y, PLAYER_WIDTH, PLAYER_HEIGHT);
            let shape = world.insert(Some(id), rect, Category::Player);
            Entity::new(
                id,
                shape,
                rect,
                Behavior::Player(PlayerState::new(color, &tuning)),
            )
        };

        let fire = spawn_player(&mut world, PlayerColor::Fire, map.fire_spawn());
        let ice = spawn_player(&mut world, PlayerColor::Ice, map.ice_spawn());

        let mut level = Self {
            world,
            camera: Camera::new(),
            players: [fire, ice],
            entities: Vec::new(),
            to_add: Vec::new(),
            to_remove: Vec::new(),
            events: Vec::new(),
            boundaries: map.boundaries(),
            next_map: map.next_level().map(str::to_owned),
            coins: 0,
            finished: false,
            players_dead: false,
            next_id,
            tuning,
        };

        for &r in map.solids() {
            level.add_static(r, Category::Tile { solid: true });
        }
        for &r in map.spikes() {
            level.add_static(r, Category::Spike);
        }
        for &r in map.portals() {
            level.add_static(r, Category::Portal);
        }
        for &r in map.exits() {
            level.add_static(r, Category::Exit);
        }

        for spawn in map.spawns() {
            let p = spawn.pos;
            match spawn.kind {
                SpawnKind::Coin => {
                    let inset = (1.0 - COIN_SIZE) / 2.0;
                    level.add_entity(
                        Rect::new(p.x + inset, p.y + inset, COIN_SIZE, COIN_SIZE),
                        Category::Coin,
                        Behavior::Coin,
                    );
                }
                SpawnKind::Walker { inverted_gravity } => {
                    level.add_entity(
                        Rect::new(p.x + 0.05, p.y, ENEMY_SIZE, ENEMY_SIZE),
                        Category::Enemy,
                        Behavior::Walker(Walker::new(inverted_gravity)),
                    );
                }
                SpawnKind::Bat => {
                    level.add_entity(
                        Rect::new(p.x + 0.05, p.y + 0.05, ENEMY_SIZE, ENEMY_SIZE),
                        Category::Enemy,
                        Behavior::Bat(Bat::new()),
                    );
                }
                SpawnKind::LinkedHead { kill_y } => {
                    let kill_shape = level.world.insert(
                        None,
                        Rect::new(p.x + 0.05, kill_y, ENEMY_SIZE, ENEMY_SIZE),
                        Category::KillPart,
                    );
                    level.add_entity(
                        Rect::new(p.x + 0.05, p.y, ENEMY_SIZE, ENEMY_SIZE),
                        Category::Enemy,
                        Behavior::LinkedHead(LinkedHead::new(
                            Walker::new(false),
                            kill_shape,
                            kill_y,
                        )),
                    );
                }
            }
        }

        let (a, b) = level.player_centers();
        for _ in 0..CAMERA_WARMUP {
            level
                .camera
                .update(a, b, level.boundaries, CAMERA_WARMUP_DT);
        }

        log::info!(
            "level '{}' ready: {} pending entities, {} shapes",
            map.name(),
            level.to_add.len(),
            level.world.len()
        );
        level
    }

    /// Advance one fixed tick. No-op once the level is finished.
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        if self.finished {
            return;
        }

        let mut fx = Effects::default();

        {
            let Self {
                world,
                players,
                entities,
                tuning,
                ..
            } = self;

            for p in players.iter_mut() {
                if let Behavior::Player(state) = &mut p.behavior {
                    let pad = input.pads[state.color.pad_slot()];
                    state.update(world, p.shape, &mut p.rect, pad, &mut fx, tuning, dt);
                }
            }

            for e in entities.iter_mut() {
                match &mut e.behavior {
                    Behavior::Walker(w) => w.update(world, e.shape, &mut e.rect, &mut fx, tuning, dt),
                    Behavior::Bat(b) => b.update(world, e.shape, &mut e.rect, &mut fx, tuning, dt),
                    Behavior::LinkedHead(h) => {
                        h.update(world, e.shape, &mut e.rect, &mut fx, tuning, dt)
                    }
                    Behavior::Coin => {}
                    // Players never live in the entity list
                    Behavior::Player(_) => {}
                }
            }
        }

        for p in &self.players {
            if self.out_of_bounds(&p.rect) {
                fx.kill_players();
            }
        }

        for &coin in fx.coins() {
            self.coins += 1;
            self.events.push(LevelEvent::CoinCollected { total: self.coins });
            self.remove_entity(coin);
        }
        if fx.killed() {
            self.kill_players();
        }
        if fx.finished() {
            self.finish_level();
        }

        // Drain deferred queues: additions first, then removals from
        // both the entity list and the collision world
        let added = std::mem::take(&mut self.to_add);
        self.entities.extend(added);

        let removed = std::mem::take(&mut self.to_remove);
        for id in removed {
            if let Some(idx) = self.entities.iter().position(|e| e.id == id) {
                let e = self.entities.remove(idx);
                self.world.remove(e.shape);
                if let Behavior::LinkedHead(head) = &e.behavior {
                    self.world.remove(head.kill_shape());
                }
            }
        }

        let (a, b) = self.player_centers();
        self.camera.update(a, b, self.boundaries, dt);
    }

    /// Register a dynamic entity: in the collision world immediately,
    /// in the live list from the next drain.
    pub fn add_entity(&mut self, rect: Rect, category: Category, behavior: Behavior) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let shape = self.world.insert(Some(id), rect, category);
        self.to_add.push(Entity::new(id, shape, rect, behavior));
        id
    }

    /// Register an immovable shape that is never simulated
    pub fn add_static(&mut self, rect: Rect, category: Category) {
        self.world.insert(None, rect, category);
    }

    /// Queue an entity for removal at the end of the frame. Idempotent:
    /// repeated requests for the same entity are no-ops.
    pub fn remove_entity(&mut self, id: EntityId) {
        if self.to_remove.contains(&id) {
            return;
        }
        self.to_remove.push(id);
    }

    /// Kill both players and end the level. Latches: only the first
    /// call per level instance does anything.
    pub fn kill_players(&mut self) {
        if self.finished {
            return;
        }
        log::info!("players died");
        self.players_dead = true;
        self.finished = true;
        self.events.push(LevelEvent::PlayersDied);
    }

    /// Complete the level. Latches like [`Level::kill_players`].
    pub fn finish_level(&mut self) {
        if self.finished {
            return;
        }
        log::info!("level complete, next: {:?}", self.next_map);
        self.finished = true;
        self.events.push(LevelEvent::LevelComplete {
            next_map: self.next_map.clone(),
        });
    }

    /// Hand the accumulated events to the host
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn players(&self) -> &[Entity; 2] {
        &self.players
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Read-only view of the collision world, for renderers that need
    /// shape positions (linked kill parts have no entity of their own)
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn boundaries(&self) -> Rect {
        self.boundaries
    }

    pub fn coin_count(&self) -> u32 {
        self.coins
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn players_dead(&self) -> bool {
        self.players_dead
    }

    fn player_centers(&self) -> (Vec2, Vec2) {
        (
            self.players[0].rect.center(),
            self.players[1].rect.center(),
        )
    }

    fn out_of_bounds(&self, rect: &Rect) -> bool {
        rect.top() < self.boundaries.y - OUT_OF_BOUNDS_MARGIN
            || rect.y > self.boundaries.top() + OUT_OF_BOUNDS_MARGIN
    }
}
