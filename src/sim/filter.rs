//! Collision categories, responses and filters
//!
//! Every shape in the collision world carries a [`Category`]. A moving
//! shape resolves what happens on contact through a [`Filter`]: a pure
//! lookup from the other shape's category to a [`Response`]. Filters are
//! a closed set, one per mover role, so the whole contact matrix is
//! testable without building a single entity.

/// What a shape is, as far as collision resolution cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Map terrain. Non-solid tiles exist for decor overlaps and are
    /// crossed, solid ones block.
    Tile { solid: bool },
    /// Gravity portal tile - solid ground for everyone
    Portal,
    /// Kill-on-touch terrain
    Spike,
    /// Level exit trigger
    Exit,
    /// Collectible
    Coin,
    Player,
    /// Walking or flying enemy body
    Enemy,
    /// Dependent hitbox of a linked enemy
    KillPart,
}

/// How a contact is resolved for the mover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Report the contact, motion unaffected
    Touch,
    /// Pass through, report the contact
    Cross,
    /// Stop at the contact surface on the colliding axis, keep moving
    /// along the other
    Slide,
}

/// Per-role collision filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Players: blocked by terrain, notified of everything they can
    /// touch, die to enemies and spikes
    Player,
    /// Enemy bodies: blocked by terrain, notified of players, blind to
    /// pickups and other enemies
    Enemy,
    /// The bat's sight probe: only players (and occluding terrain) exist
    BatProbe,
}

impl Filter {
    /// The full contact matrix. `None` means the shapes do not interact
    /// at all - not even reported.
    pub fn respond(self, other: Category) -> Option<Response> {
        use Category::*;
        use Response::*;

        match self {
            Filter::Player => match other {
                Tile { solid: true } => Some(Slide),
                Tile { solid: false } => Some(Cross),
                // Portals are solid ground for everyone
                Portal => Some(Slide),
                Spike | Exit | Coin => Some(Cross),
                Player => Some(Cross),
                Enemy | KillPart => Some(Cross),
            },
            Filter::Enemy => match other {
                Tile { solid: true } => Some(Slide),
                Tile { solid: false } => Some(Cross),
                Portal => Some(Slide),
                Player => Some(Cross),
                Spike | Exit | Coin | Enemy | KillPart => None,
            },
            Filter::BatProbe => match other {
                Tile { solid: true } => Some(Slide),
                Tile { solid: false } => Some(Cross),
                Portal => Some(Slide),
                Player => Some(Cross),
                Spike | Exit | Coin | Enemy | KillPart => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portals_slide_for_everyone() {
        for f in [Filter::Player, Filter::Enemy, Filter::BatProbe] {
            assert_eq!(f.respond(Category::Portal), Some(Response::Slide));
        }
    }

    #[test]
    fn test_player_is_notified_of_hazards() {
        assert_eq!(Filter::Player.respond(Category::Spike), Some(Response::Cross));
        assert_eq!(Filter::Player.respond(Category::Enemy), Some(Response::Cross));
        assert_eq!(
            Filter::Player.respond(Category::KillPart),
            Some(Response::Cross)
        );
    }

    #[test]
    fn test_enemies_ignore_pickups_and_each_other() {
        assert_eq!(Filter::Enemy.respond(Category::Coin), None);
        assert_eq!(Filter::Enemy.respond(Category::Enemy), None);
        assert_eq!(Filter::Enemy.respond(Category::Spike), None);
    }

    #[test]
    fn test_bat_probe_only_reacts_to_players_and_terrain() {
        assert_eq!(
            Filter::BatProbe.respond(Category::Player),
            Some(Response::Cross)
        );
        assert_eq!(Filter::BatProbe.respond(Category::Coin), None);
        assert_eq!(Filter::BatProbe.respond(Category::Enemy), None);
        assert_eq!(
            Filter::BatProbe.respond(Category::Tile { solid: true }),
            Some(Response::Slide)
        );
    }

    #[test]
    fn test_players_cross_each_other() {
        assert_eq!(
            Filter::Player.respond(Category::Player),
            Some(Response::Cross)
        );
    }
}
