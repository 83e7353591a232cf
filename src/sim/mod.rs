//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (broad-phase candidates and contacts sorted)
//! - Entity list mutations deferred to end-of-frame drains
//! - No rendering or platform dependencies

pub mod body;
pub mod camera;
pub mod enemy;
pub mod entity;
pub mod filter;
pub mod level;
pub mod player;
pub mod rect;
pub mod world;

pub use body::Body;
pub use camera::Camera;
pub use enemy::{Bat, LinkedHead, Walker};
pub use entity::{Behavior, Entity, EntityId};
pub use filter::{Category, Filter, Response};
pub use level::{Effects, Level, LevelEvent, PadInput, TickInput};
pub use player::{PlayerColor, PlayerState, PLAYER_HEIGHT, PLAYER_WIDTH};
pub use rect::Rect;
pub use world::{Contact, Hit, MoveResult, ShapeId, World};
