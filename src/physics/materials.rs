use std::collections::HashMap;

use log::warn;

/// Material tag attached to every collidable body. Contact behavior is
/// defined per pair of tags, not per body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Surface {
    Player,
    Ground,
    Wall,
    Dice,
    Ball,
    Crate,
}

/// Friction/restitution for one surface pair.
#[derive(Clone, Copy, Debug)]
pub struct ContactParams {
    pub friction: f32,
    pub restitution: f32,
}

/// Symmetric lookup table of contact parameters. Pairs are registered once
/// at world construction; lookups for unregistered pairs fall back to the
/// default params.
pub struct ContactTable {
    pairs: HashMap<(Surface, Surface), ContactParams>,
    default: ContactParams,
}

fn pair_key(a: Surface, b: Surface) -> (Surface, Surface) {
    if a as u8 <= b as u8 {
        (a, b)
    } else {
        (b, a)
    }
}

impl ContactTable {
    pub fn new(default: ContactParams) -> Self {
        Self {
            pairs: HashMap::new(),
            default,
        }
    }

    /// Register `params` for the unordered pair `(a, b)`. Re-registering a
    /// pair replaces the old entry with a warning; the table is meant to be
    /// filled once.
    pub fn register(&mut self, a: Surface, b: Surface, params: ContactParams) {
        if self.pairs.insert(pair_key(a, b), params).is_some() {
            warn!("contact pair {a:?}/{b:?} registered twice, keeping the later entry");
        }
    }

    pub fn lookup(&self, a: Surface, b: Surface) -> ContactParams {
        self.pairs
            .get(&pair_key(a, b))
            .copied()
            .unwrap_or(self.default)
    }

    /// The pairs every room in the hub uses.
    pub fn standard() -> Self {
        let mut table = ContactTable::new(ContactParams {
            friction: 0.5,
            restitution: 0.0,
        });
        table.register(
            Surface::Player,
            Surface::Ground,
            ContactParams {
                friction: 0.5,
                restitution: 0.0,
            },
        );
        // Frictionless walls so the player does not stick while strafing.
        table.register(
            Surface::Player,
            Surface::Wall,
            ContactParams {
                friction: 0.0,
                restitution: 0.0,
            },
        );
        table.register(
            Surface::Dice,
            Surface::Ground,
            ContactParams {
                friction: 0.5,
                restitution: 0.3,
            },
        );
        table.register(
            Surface::Dice,
            Surface::Wall,
            ContactParams {
                friction: 0.1,
                restitution: 0.5,
            },
        );
        table.register(
            Surface::Ball,
            Surface::Ground,
            ContactParams {
                friction: 0.7,
                restitution: 0.6,
            },
        );
        table.register(
            Surface::Ball,
            Surface::Wall,
            ContactParams {
                friction: 0.3,
                restitution: 0.5,
            },
        );
        table.register(
            Surface::Crate,
            Surface::Ground,
            ContactParams {
                friction: 0.6,
                restitution: 0.1,
            },
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_symmetric() {
        let table = ContactTable::standard();
        let ab = table.lookup(Surface::Dice, Surface::Ground);
        let ba = table.lookup(Surface::Ground, Surface::Dice);
        assert_eq!(ab.friction, ba.friction);
        assert_eq!(ab.restitution, ba.restitution);
        assert_eq!(ab.restitution, 0.3);
    }

    #[test]
    fn unregistered_pair_falls_back_to_default() {
        let table = ContactTable::standard();
        let p = table.lookup(Surface::Ball, Surface::Dice);
        assert_eq!(p.friction, 0.5);
        assert_eq!(p.restitution, 0.0);
    }
}
