//! The collision world
//!
//! Owns every collidable AABB in a level. Shapes are registered with a
//! [`Category`] and an optional owner entity, then probed with
//! [`World::project`] or moved with [`World::move_shape`], which runs a
//! broad-phase lookup over a spatial hash followed by an axis-separated
//! sweep with slide/cross/touch resolution.
//!
//! Handles are never shared across worlds; using a stale or foreign
//! handle is an invariant violation and panics.

use std::collections::HashMap;

use glam::Vec2;

use super::entity::EntityId;
use super::filter::{Category, Filter, Response};
use super::rect::Rect;

/// Handle to a shape owned by the collision world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u32);

#[derive(Debug)]
struct Shape {
    rect: Rect,
    owner: Option<EntityId>,
    category: Category,
}

/// A shape found by a static probe
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub shape: ShapeId,
    pub owner: Option<EntityId>,
    pub category: Category,
    pub response: Response,
    pub rect: Rect,
}

/// A contact reported by a resolved move
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub other: ShapeId,
    pub owner: Option<EntityId>,
    pub category: Category,
    pub response: Response,
    /// Unit normal of the contacted surface, opposing the motion on the
    /// colliding axis
    pub normal: Vec2,
}

/// Outcome of [`World::move_shape`]: the resolved position and the
/// contacts encountered on the way, in deterministic order (x-axis
/// contacts before y-axis, nearest first, ties by ascending handle).
#[derive(Debug)]
pub struct MoveResult {
    pub x: f32,
    pub y: f32,
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Default broad-phase cell size in world units
const CELL_SIZE: f32 = 4.0;

pub struct World {
    cell_size: f32,
    shapes: HashMap<u32, Shape>,
    grid: HashMap<(i32, i32), Vec<u32>>,
    next_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_cell_size(CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size,
            shapes: HashMap::new(),
            grid: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register a shape. The world owns the rectangle from here on;
    /// callers keep the handle and read positions back through it.
    pub fn insert(&mut self, owner: Option<EntityId>, rect: Rect, category: Category) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        self.grid_insert(id, &rect);
        self.shapes.insert(id, Shape { rect, owner, category });
        ShapeId(id)
    }

    /// Unregister a shape. Panics on a stale handle.
    pub fn remove(&mut self, shape: ShapeId) {
        let s = self
            .shapes
            .remove(&shape.0)
            .unwrap_or_else(|| panic!("collision world: remove of unknown shape {shape:?}"));
        self.grid_remove(shape.0, &s.rect);
    }

    /// Current rectangle of a shape. Panics on a stale handle.
    pub fn rect(&self, shape: ShapeId) -> Rect {
        self.shape(shape).rect
    }

    /// Number of live shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Teleport a shape without collision resolution. Used for dependent
    /// parts that mirror their owner's position.
    pub fn update_rect(&mut self, shape: ShapeId, x: f32, y: f32) {
        let old = self.shape(shape).rect;
        let new = old.at(x, y);
        if self.cell_span(&old) != self.cell_span(&new) {
            self.grid_remove(shape.0, &old);
            self.grid_insert(shape.0, &new);
        }
        self.shape_mut(shape).rect = new;
    }

    /// Probe a rectangle: every shape overlapping it that the filter
    /// does not ignore, in ascending handle order. The probing shape
    /// itself is excluded.
    pub fn project(&self, shape: ShapeId, probe: Rect, filter: Filter) -> Vec<Hit> {
        let _ = self.shape(shape);
        let mut hits = Vec::new();
        for id in self.candidates(&probe) {
            if id == shape.0 {
                continue;
            }
            let other = &self.shapes[&id];
            let Some(response) = filter.respond(other.category) else {
                continue;
            };
            if probe.overlaps(&other.rect) {
                hits.push(Hit {
                    shape: ShapeId(id),
                    owner: other.owner,
                    category: other.category,
                    response,
                    rect: other.rect,
                });
            }
        }
        hits
    }

    /// Attempt to move a shape to a goal position, resolving contacts
    /// along the way. `Slide` contacts clamp motion at the contact
    /// surface on the colliding axis; `Cross`/`Touch` are reported
    /// without obstructing. The shape's stored rectangle is updated to
    /// the resolved position.
    pub fn move_shape(
        &mut self,
        shape: ShapeId,
        goal_x: f32,
        goal_y: f32,
        filter: Filter,
    ) -> MoveResult {
        let mut rect = self.shape(shape).rect;
        let mut contacts = Vec::new();
        let mut seen = Vec::new();

        let dx = self.sweep_axis(
            shape.0,
            &rect,
            goal_x - rect.x,
            Axis::X,
            filter,
            &mut contacts,
            &mut seen,
        );
        rect.x += dx;

        let dy = self.sweep_axis(
            shape.0,
            &rect,
            goal_y - rect.y,
            Axis::Y,
            filter,
            &mut contacts,
            &mut seen,
        );
        rect.y += dy;

        self.update_rect(shape, rect.x, rect.y);
        MoveResult {
            x: rect.x,
            y: rect.y,
            contacts,
        }
    }

    /// Sweep the mover along one axis, returning the allowed signed
    /// delta. Contacts reached before the nearest blocking surface are
    /// recorded nearest-first; everything past the stop point never
    /// happened.
    fn sweep_axis(
        &self,
        mover: u32,
        rect: &Rect,
        delta: f32,
        axis: Axis,
        filter: Filter,
        contacts: &mut Vec<Contact>,
        seen: &mut Vec<u32>,
    ) -> f32 {
        if delta == 0.0 {
            return 0.0;
        }

        struct AxisHit {
            gap: f32,
            id: u32,
            response: Response,
            blocking: bool,
        }

        let broad = match axis {
            Axis::X => rect.swept_x(delta),
            Axis::Y => rect.swept_y(delta),
        };

        let mut hits: Vec<AxisHit> = Vec::new();
        for id in self.candidates(&broad) {
            if id == mover || seen.contains(&id) {
                continue;
            }
            let other = &self.shapes[&id];
            let Some(response) = filter.respond(other.category) else {
                continue;
            };
            let perp_overlap = match axis {
                Axis::X => rect.overlaps_y(&other.rect),
                Axis::Y => rect.overlaps_x(&other.rect),
            };
            if !perp_overlap {
                continue;
            }

            let (a_min, a_max, b_min, b_max) = match axis {
                Axis::X => (rect.x, rect.right(), other.rect.x, other.rect.right()),
                Axis::Y => (rect.y, rect.top(), other.rect.y, other.rect.top()),
            };

            if a_min < b_max && a_max > b_min {
                // Already interpenetrating on this axis: zero-distance
                // contact, blocking only when moving deeper in.
                let deeper = (b_min + b_max - a_min - a_max) * delta > 0.0;
                hits.push(AxisHit {
                    gap: 0.0,
                    id,
                    response,
                    blocking: response == Response::Slide && deeper,
                });
            } else {
                let gap = if delta > 0.0 && b_min >= a_max {
                    b_min - a_max
                } else if delta < 0.0 && b_max <= a_min {
                    a_min - b_max
                } else {
                    continue;
                };
                if gap > delta.abs() {
                    continue;
                }
                hits.push(AxisHit {
                    gap,
                    id,
                    response,
                    blocking: response == Response::Slide,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.gap
                .partial_cmp(&b.gap)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let normal = match axis {
            Axis::X => Vec2::new(-delta.signum(), 0.0),
            Axis::Y => Vec2::new(0.0, -delta.signum()),
        };

        let mut allowed = delta.abs();
        for hit in hits {
            if hit.gap > allowed {
                break;
            }
            if hit.blocking {
                allowed = allowed.min(hit.gap);
            }
            let other = &self.shapes[&hit.id];
            contacts.push(Contact {
                other: ShapeId(hit.id),
                owner: other.owner,
                category: other.category,
                response: hit.response,
                normal,
            });
            seen.push(hit.id);
        }

        allowed * delta.signum()
    }

    fn shape(&self, id: ShapeId) -> &Shape {
        self.shapes
            .get(&id.0)
            .unwrap_or_else(|| panic!("collision world: unknown shape handle {id:?}"))
    }

    fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        self.shapes
            .get_mut(&id.0)
            .unwrap_or_else(|| panic!("collision world: unknown shape handle {id:?}"))
    }

    /// All shape ids whose cells intersect the probe, sorted and deduped
    /// so downstream iteration is deterministic.
    fn candidates(&self, probe: &Rect) -> Vec<u32> {
        let (x0, x1, y0, y1) = self.cell_span(probe);
        let mut ids = Vec::new();
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(cell) = self.grid.get(&(cx, cy)) {
                    ids.extend_from_slice(cell);
                }
            }
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn cell_span(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let cs = self.cell_size;
        (
            (r.x / cs).floor() as i32,
            (r.right() / cs).floor() as i32,
            (r.y / cs).floor() as i32,
            (r.top() / cs).floor() as i32,
        )
    }

    fn grid_insert(&mut self, id: u32, rect: &Rect) {
        let (x0, x1, y0, y1) = self.cell_span(rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                self.grid.entry((cx, cy)).or_default().push(id);
            }
        }
    }

    fn grid_remove(&mut self, id: u32, rect: &Rect) {
        let (x0, x1, y0, y1) = self.cell_span(rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let mut emptied = false;
                if let Some(cell) = self.grid.get_mut(&(cx, cy)) {
                    cell.retain(|&v| v != id);
                    emptied = cell.is_empty();
                }
                if emptied {
                    self.grid.remove(&(cx, cy));
                }
            }
        }
    }
}
