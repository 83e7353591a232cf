//! Enemy behaviors
//!
//! All enemies are variations on the shared movement controller: the
//! walker patrols and turns around on wall hits, the bat hovers until a
//! player enters its sight and then flies at them, and the linked enemy
//! is a walker that drags a dependent kill shape mirrored to its own x.

use glam::Vec2;

use crate::approach;
use crate::tuning::Tuning;

use super::body::Body;
use super::filter::{Category, Filter, Response};
use super::level::Effects;
use super::rect::Rect;
use super::world::{Contact, ShapeId, World};

/// Input magnitude for patrols - walkers amble well below full speed
const PATROL_INPUT: f32 = 0.3;

/// Ground patroller. Walks one way until a wall stops it, then the other.
#[derive(Debug)]
pub struct Walker {
    pub body: Body,
    moving_right: bool,
}

impl Walker {
    pub fn new(inverted_gravity: bool) -> Self {
        let mut body = Body::new(0);
        body.inverted_gravity = inverted_gravity;
        Self {
            body,
            moving_right: true,
        }
    }

    pub fn update(
        &mut self,
        world: &mut World,
        shape: ShapeId,
        rect: &mut Rect,
        fx: &mut Effects,
        t: &Tuning,
        dt: f32,
    ) {
        if self.moving_right {
            self.body.move_right = PATROL_INPUT;
            self.body.move_left = 0.0;
        } else {
            self.body.move_left = PATROL_INPUT;
            self.body.move_right = 0.0;
        }

        let contacts = self.body.step(world, shape, rect, Filter::Enemy, &t.walker, dt);
        self.react(&contacts, fx);
    }

    fn react(&mut self, contacts: &[Contact], fx: &mut Effects) {
        for contact in contacts {
            if contact.category == Category::Player {
                fx.kill_players();
                continue;
            }
            if contact.response == Response::Slide && contact.normal.x != 0.0 {
                log::debug!("walker turning around");
                self.moving_right = !self.moving_right;
            }
        }
    }
}

/// Flying ambusher. Hovers in place until a player enters its sight
/// box, then steers toward them, ignoring gravity.
#[derive(Debug)]
pub struct Bat {
    pub vel: Vec2,
    awake: bool,
}

impl Bat {
    pub fn new() -> Self {
        Self {
            vel: Vec2::ZERO,
            awake: false,
        }
    }

    pub fn awake(&self) -> bool {
        self.awake
    }

    pub fn update(
        &mut self,
        world: &mut World,
        shape: ShapeId,
        rect: &mut Rect,
        fx: &mut Effects,
        t: &Tuning,
        dt: f32,
    ) {
        let bt = &t.bat;
        let center = rect.center();
        let sight = Rect::new(
            center.x - bt.sight,
            center.y - bt.sight,
            bt.sight * 2.0,
            bt.sight * 2.0,
        );

        let target = world
            .project(shape, sight, Filter::BatProbe)
            .into_iter()
            .find(|hit| hit.category == Category::Player)
            .map(|hit| hit.rect.center());

        match target {
            Some(target) => {
                if !self.awake {
                    self.awake = true;
                    log::debug!("bat spotted a player");
                }
                let dir = (target - center).normalize_or_zero();
                self.vel.x = approach(self.vel.x, dir.x * bt.speed, bt.accel);
                self.vel.y = approach(self.vel.y, dir.y * bt.speed, bt.accel);
            }
            None => {
                self.vel.x = approach(self.vel.x, 0.0, bt.accel);
                self.vel.y = approach(self.vel.y, 0.0, bt.accel);
            }
        }

        let result = world.move_shape(
            shape,
            rect.x + self.vel.x * dt,
            rect.y + self.vel.y * dt,
            Filter::Enemy,
        );
        for contact in &result.contacts {
            if contact.category == Category::Player {
                fx.kill_players();
            } else if contact.response == Response::Slide {
                if contact.normal.x != 0.0 {
                    self.vel.x = 0.0;
                }
                if contact.normal.y != 0.0 {
                    self.vel.y = 0.0;
                }
            }
        }
        rect.x = result.x;
        rect.y = result.y;
    }
}

impl Default for Bat {
    fn default() -> Self {
        Self::new()
    }
}

/// A walker that owns a second, dependent kill shape and repositions it
/// to mirror its own x each tick. The part is not an entity and never
/// reads anything back from the head.
#[derive(Debug)]
pub struct LinkedHead {
    pub walker: Walker,
    kill_shape: ShapeId,
    kill_y: f32,
}

impl LinkedHead {
    pub fn new(walker: Walker, kill_shape: ShapeId, kill_y: f32) -> Self {
        Self {
            walker,
            kill_shape,
            kill_y,
        }
    }

    pub fn kill_shape(&self) -> ShapeId {
        self.kill_shape
    }

    pub fn update(
        &mut self,
        world: &mut World,
        shape: ShapeId,
        rect: &mut Rect,
        fx: &mut Effects,
        t: &Tuning,
        dt: f32,
    ) {
        self.walker.update(world, shape, rect, fx, t, dt);
        world.update_rect(self.kill_shape, rect.x, self.kill_y);
    }
}
