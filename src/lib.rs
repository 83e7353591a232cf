//! Twinfall - a cooperative two-player platformer with mirrored gravity
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision world, movement, entities, camera)
//! - `map`: Level file parsing and spawn/boundary data
//! - `tuning`: Data-driven physics constants

pub mod map;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (100 Hz)
    pub const SIM_DT: f32 = 0.01;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport extent in world units at zoom 1.0
    pub const VIEW_WIDTH: f32 = 80.0;
    pub const VIEW_HEIGHT: f32 = 40.0;
}

/// Move `value` toward `target` by at most `step`, never overshooting.
///
/// The workhorse of velocity smoothing: acceleration, friction and the
/// camera warm-up all step toward their targets through this.
#[inline]
pub fn approach(value: f32, target: f32, step: f32) -> f32 {
    let step = step.abs();
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

/// Frame-rate-independent smoothing factor for exponential-decay lerps.
///
/// Returns the fraction of the remaining distance to cover this frame so
/// the decay's half-life stays constant regardless of `dt`.
#[inline]
pub fn smoothing(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}
