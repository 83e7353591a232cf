//! Shared movement physics for dynamic entities
//!
//! A [`Body`] is the one movement controller in the game: players,
//! patrol walkers and linked enemies all advance through the same
//! per-tick state machine - ground probe, jump budget, input approach,
//! gravity, then a collision-resolved move. Per-variant behavior sets
//! the input fields before [`Body::step`] and reacts to the returned
//! contacts after it.
//!
//! All tuning constants are per-tick impulses; `dt` only scales the
//! position integration.

use glam::Vec2;

use crate::approach;
use crate::tuning::MoverTuning;

use super::filter::{Filter, Response};
use super::rect::Rect;
use super::world::{Contact, ShapeId, World};

/// How far past the footprint the ground probe reaches
const GROUND_PROBE: f32 = 0.1;

/// Movement state for one dynamic entity
#[derive(Debug, Clone)]
pub struct Body {
    pub vel: Vec2,
    pub facing_right: bool,
    /// Flips the sign of gravity and of the "up" reference used for
    /// grounded and landing checks. Magnitudes are unchanged.
    pub inverted_gravity: bool,

    /// Input intent, set by behavior code each tick. Magnitudes in
    /// [0, 1]; enemies patrol with partial magnitudes.
    pub move_left: f32,
    pub move_right: f32,
    /// Edge-triggered: true only on the tick the jump was requested
    pub jump: bool,

    grounded: bool,
    jumping: bool,
    jumps_left: u32,
}

impl Body {
    pub fn new(max_jumps: u32) -> Self {
        Self {
            vel: Vec2::ZERO,
            facing_right: true,
            inverted_gravity: false,
            move_left: 0.0,
            move_right: 0.0,
            jump: false,
            grounded: false,
            jumping: false,
            jumps_left: max_jumps,
        }
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn jumps_left(&self) -> u32 {
        self.jumps_left
    }

    /// `v` in world space for this body's gravity orientation
    #[inline]
    fn signed(&self, v: f32) -> f32 {
        if self.inverted_gravity { -v } else { v }
    }

    /// Advance one fixed tick. Applies the default contact reactions
    /// (wall stops, floor/ceiling stops, landing) and returns every
    /// contact so callers can layer their own.
    pub fn step(
        &mut self,
        world: &mut World,
        shape: ShapeId,
        rect: &mut Rect,
        filter: Filter,
        t: &MoverTuning,
        dt: f32,
    ) -> Vec<Contact> {
        self.check_ground(world, shape, rect, filter);
        self.check_jump(t);
        self.update_facing();
        self.apply_input(t);
        self.apply_gravity(t);

        let result = world.move_shape(
            shape,
            rect.x + self.vel.x * dt,
            rect.y + self.vel.y * dt,
            filter,
        );
        for contact in &result.contacts {
            self.react(contact, t);
        }
        rect.x = result.x;
        rect.y = result.y;

        self.jump = false;
        result.contacts
    }

    /// Grounded when a probe one epsilon past the footprint, in the
    /// direction gravity pulls, finds a blocking surface.
    fn check_ground(&mut self, world: &World, shape: ShapeId, rect: &Rect, filter: Filter) {
        let probe = rect.at(rect.x, rect.y - self.signed(GROUND_PROBE));
        let hits = world.project(shape, probe, filter);
        self.grounded = hits.iter().any(|h| h.response == Response::Slide);
    }

    fn check_jump(&mut self, t: &MoverTuning) {
        if !self.jump {
            return;
        }

        if self.grounded && !self.jumping {
            self.jumps_left = t.max_jumps.saturating_sub(1);
            self.vel.y += self.signed(t.jump_force);
            self.jumping = true;
        } else if !self.grounded && self.jumps_left > 0 {
            self.vel.y += self.signed(t.jump_force);
            self.jumps_left -= 1;
        }
    }

    fn update_facing(&mut self) {
        let input = self.move_right - self.move_left;
        if self.facing_right && input < 0.0 {
            self.facing_right = false;
        } else if !self.facing_right && input > 0.0 {
            self.facing_right = true;
        }
    }

    fn apply_input(&mut self, t: &MoverTuning) {
        let input = self.move_right - self.move_left;
        if input != 0.0 {
            self.vel.x = approach(self.vel.x, input * t.max_speed, t.accel);
        } else {
            self.vel.x = approach(self.vel.x, 0.0, t.friction);
        }
    }

    fn apply_gravity(&mut self, t: &MoverTuning) {
        self.vel.y += self.signed(t.gravity);

        // Once vertical velocity turns toward the fall, the jump is over
        if self.jumping && self.signed(self.vel.y) < 0.0 {
            self.jumping = false;
        }
    }

    /// Default reaction to a blocking contact: stop on the colliding
    /// axis; a surface facing "up" relative to gravity is a landing.
    fn react(&mut self, contact: &Contact, t: &MoverTuning) {
        if contact.response != Response::Slide {
            return;
        }

        if contact.normal.x != 0.0 {
            self.vel.x = 0.0;
        }
        if contact.normal.y != 0.0 {
            self.vel.y = 0.0;

            if contact.normal.y == self.signed(1.0) {
                self.jumping = false;
                self.jumps_left = t.max_jumps;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::filter::Category;

    const DT: f32 = 0.01;

    fn flat_ground() -> (World, ShapeId, Rect, Body) {
        let mut world = World::new();
        world.insert(
            None,
            Rect::new(-20.0, 0.0, 40.0, 1.0),
            Category::Tile { solid: true },
        );
        let rect = Rect::new(0.0, 1.0, 1.0, 2.0);
        let shape = world.insert(None, rect, Category::Player);
        (world, shape, rect, Body::new(2))
    }

    #[test]
    fn test_settles_on_flat_ground() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);

        assert!(body.grounded());
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(rect.y, 1.0);
    }

    #[test]
    fn test_jump_budget_two_then_one_then_none() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        // Grounded jump consumes the first slot
        body.jump = true;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.jumps_left(), 1);
        assert!(body.vel.y > 0.0);

        // Mid-air jump consumes the second
        body.jump = true;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.jumps_left(), 0);

        // A third request changes nothing but gravity
        let before = body.vel.y;
        body.jump = true;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.vel.y, before + t.gravity);
        assert_eq!(body.jumps_left(), 0);
    }

    #[test]
    fn test_budget_refills_on_landing() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        body.jump = true;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        body.jump = true;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.jumps_left(), 0);

        // Fall back down and land
        for _ in 0..1000 {
            body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
            if body.grounded() && body.vel.y == 0.0 {
                break;
            }
        }
        assert!(body.grounded());

        body.jump = true;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.jumps_left(), 1);
    }

    #[test]
    fn test_friction_steps_toward_zero() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        body.vel.x = 10.0;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.vel.x, 10.0 - t.friction);
    }

    #[test]
    fn test_input_accelerates_toward_max_speed() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        body.move_right = 1.0;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert_eq!(body.vel.x, t.accel);
        assert!(body.facing_right);

        for _ in 0..100 {
            body.move_right = 1.0;
            body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        }
        assert_eq!(body.vel.x, t.max_speed);
    }

    #[test]
    fn test_partial_input_caps_patrol_speed() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        for _ in 0..200 {
            body.move_right = 0.3;
            body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        }
        assert_eq!(body.vel.x, 0.3 * t.max_speed);
    }

    #[test]
    fn test_facing_flips_with_input_sign() {
        let (mut world, shape, mut rect, mut body) = flat_ground();
        let t = MoverTuning::default();

        body.move_left = 1.0;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert!(!body.facing_right);

        body.move_left = 0.0;
        body.move_right = 1.0;
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);
        assert!(body.facing_right);
    }

    #[test]
    fn test_wall_hit_zeroes_horizontal_velocity_only() {
        let mut world = World::new();
        world.insert(
            None,
            Rect::new(1.05, -5.0, 1.0, 10.0),
            Category::Tile { solid: true },
        );
        let mut rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        let shape = world.insert(None, rect, Category::Player);
        let mut body = Body::new(2);
        // Weightless so the vertical component is isolated
        let t = MoverTuning {
            gravity: 0.0,
            friction: 0.0,
            ..MoverTuning::default()
        };

        body.vel = Vec2::new(20.0, 3.0);
        body.step(&mut world, shape, &mut rect, Filter::Player, &t, DT);

        assert_eq!(body.vel.x, 0.0);
        assert_eq!(body.vel.y, 3.0);
        assert!((rect.x - 0.05).abs() < 1e-5); // flush against the wall
    }

    #[test]
    fn test_inverted_gravity_mirrors_vertical_motion() {
        let t = MoverTuning::default();

        let (mut world_n, shape_n, mut rect_n, mut body_n) = flat_ground();

        // Mirrored setup: ceiling above, gravity pulling up
        let mut world_i = World::new();
        world_i.insert(
            None,
            Rect::new(-20.0, 4.0, 40.0, 1.0),
            Category::Tile { solid: true },
        );
        let mut rect_i = Rect::new(0.0, 2.0, 1.0, 2.0);
        let shape_i = world_i.insert(None, rect_i, Category::Player);
        let mut body_i = Body::new(2);
        body_i.inverted_gravity = true;

        for tick in 0..200 {
            body_n.jump = tick == 5;
            body_i.jump = tick == 5;
            body_n.step(&mut world_n, shape_n, &mut rect_n, Filter::Player, &t, DT);
            body_i.step(&mut world_i, shape_i, &mut rect_i, Filter::Player, &t, DT);

            assert_eq!(body_i.vel.y, -body_n.vel.y, "tick {tick}");
            assert_eq!(body_i.grounded(), body_n.grounded(), "tick {tick}");
        }
    }
}
