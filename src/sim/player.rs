//! Player controllers
//!
//! A player is the movement controller bound to an input pad, plus a
//! color identity and the gravity-portal bookkeeping. The fire player
//! lives in the lower world; the ice player starts with inverted
//! gravity in the mirrored upper world.

use crate::tuning::Tuning;

use super::body::Body;
use super::filter::{Category, Filter, Response};
use super::level::{Effects, PadInput};
use super::rect::Rect;
use super::world::{ShapeId, World};

pub const PLAYER_WIDTH: f32 = 0.9;
pub const PLAYER_HEIGHT: f32 = 1.8;

/// Seconds before a portal can flip the same player again. Keeps a
/// standing contact from oscillating the gravity sign every tick.
const PORTAL_COOLDOWN: f32 = 0.5;

/// The two fixed player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerColor {
    Fire,
    Ice,
}

impl PlayerColor {
    /// Which input pad this color reads
    pub fn pad_slot(self) -> usize {
        match self {
            PlayerColor::Fire => 0,
            PlayerColor::Ice => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerColor::Fire => "fire",
            PlayerColor::Ice => "ice",
        }
    }
}

#[derive(Debug)]
pub struct PlayerState {
    pub color: PlayerColor,
    pub body: Body,
    portal_cooldown: f32,
}

impl PlayerState {
    pub fn new(color: PlayerColor, t: &Tuning) -> Self {
        let mut body = Body::new(t.player.max_jumps);
        body.inverted_gravity = color == PlayerColor::Ice;
        Self {
            color,
            body,
            portal_cooldown: 0.0,
        }
    }

    /// One fixed tick: poll the pad, run the shared movement step, then
    /// react to whatever was touched on the way.
    pub fn update(
        &mut self,
        world: &mut World,
        shape: ShapeId,
        rect: &mut Rect,
        pad: PadInput,
        fx: &mut Effects,
        t: &Tuning,
        dt: f32,
    ) {
        if self.portal_cooldown > 0.0 {
            self.portal_cooldown = (self.portal_cooldown - dt).max(0.0);
        }

        self.body.move_left = if pad.left { 1.0 } else { 0.0 };
        self.body.move_right = if pad.right { 1.0 } else { 0.0 };
        self.body.jump = pad.jump_pressed;

        let contacts = self.body.step(world, shape, rect, Filter::Player, &t.player, dt);
        for contact in contacts {
            match contact.category {
                Category::Coin => {
                    if let Some(owner) = contact.owner {
                        fx.collect_coin(owner);
                    }
                }
                Category::Spike | Category::Enemy | Category::KillPart => {
                    fx.kill_players();
                }
                Category::Exit => {
                    fx.finish_level();
                }
                Category::Portal => {
                    if contact.response == Response::Slide && self.portal_cooldown == 0.0 {
                        self.body.inverted_gravity = !self.body.inverted_gravity;
                        self.portal_cooldown = PORTAL_COOLDOWN;
                        log::info!("{} player flipped gravity", self.color.as_str());
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.01;

    fn held(left: bool, right: bool, jump: bool) -> PadInput {
        PadInput {
            left,
            right,
            jump_pressed: jump,
        }
    }

    fn setup(tile: Category, tile_rect: Rect) -> (World, ShapeId, Rect, PlayerState, Tuning) {
        let mut world = World::new();
        world.insert(None, tile_rect, tile);
        let rect = Rect::new(0.0, 1.0, PLAYER_WIDTH, PLAYER_HEIGHT);
        let shape = world.insert(None, rect, Category::Player);
        let t = Tuning::default();
        let player = PlayerState::new(PlayerColor::Fire, &t);
        (world, shape, rect, player, t)
    }

    #[test]
    fn test_pad_drives_movement() {
        let (mut world, shape, mut rect, mut player, t) = setup(
            Category::Tile { solid: true },
            Rect::new(-20.0, 0.0, 40.0, 1.0),
        );
        let mut fx = Effects::default();

        player.update(
            &mut world,
            shape,
            &mut rect,
            held(false, true, false),
            &mut fx,
            &t,
            DT,
        );
        assert!(player.body.vel.x > 0.0);
        assert!(player.body.facing_right);

        player.update(
            &mut world,
            shape,
            &mut rect,
            held(true, false, false),
            &mut fx,
            &t,
            DT,
        );
        assert!(!player.body.facing_right);
    }

    #[test]
    fn test_ice_player_starts_inverted() {
        let t = Tuning::default();
        assert!(PlayerState::new(PlayerColor::Ice, &t).body.inverted_gravity);
        assert!(!PlayerState::new(PlayerColor::Fire, &t).body.inverted_gravity);
    }

    #[test]
    fn test_spike_contact_kills() {
        let (mut world, shape, mut rect, mut player, t) =
            setup(Category::Spike, Rect::new(-20.0, 0.0, 40.0, 1.0));
        let mut fx = Effects::default();

        // Falling onto the spike bed: spikes cross, so the player sinks
        // into them and the contact reports
        for _ in 0..10 {
            player.update(
                &mut world,
                shape,
                &mut rect,
                held(false, false, false),
                &mut fx,
                &t,
                DT,
            );
        }
        assert!(fx.killed());
    }

    #[test]
    fn test_portal_flips_gravity_once_per_cooldown() {
        let (mut world, shape, mut rect, mut player, t) =
            setup(Category::Portal, Rect::new(-20.0, 0.0, 40.0, 1.0));
        let mut fx = Effects::default();

        // Standing on a portal: one flip, then the cooldown holds even
        // though the contact repeats while gravity pulls away
        player.update(
            &mut world,
            shape,
            &mut rect,
            held(false, false, false),
            &mut fx,
            &t,
            DT,
        );
        assert!(player.body.inverted_gravity);

        player.update(
            &mut world,
            shape,
            &mut rect,
            held(false, false, false),
            &mut fx,
            &t,
            DT,
        );
        assert!(player.body.inverted_gravity, "cooldown must hold the flip");
    }
}
