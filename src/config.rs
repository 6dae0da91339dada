use glam::Vec3;
use thiserror::Error;

/// Fixed simulation timestep.
pub const FIXED_DT: f32 = 1.0 / 60.0;
/// Substep cap for long frames.
pub const MAX_SUBSTEPS: u32 = 3;
pub const GRAVITY: Vec3 = Vec3::new(0.0, -20.0, 0.0);

pub mod player {
    pub const RADIUS: f32 = 0.4;
    pub const MASS: f32 = 80.0;
    pub const MOVE_SPEED: f32 = 15.0;
    pub const SPRINT_MULTIPLIER: f32 = 2.0;
    pub const JUMP_FORCE: f32 = 8.0;
    pub const SPAWN_HEIGHT: f32 = 0.5;
    pub const EYE_HEIGHT: f32 = 2.5;
    pub const MOUSE_SENSITIVITY: f32 = 0.5;
}

/// Distance from the camera eye within which a portal reacts to interact.
pub const PORTAL_INTERACTION_DISTANCE: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomId {
    Hub,
    Dice,
    Basketball,
    Sequence,
}

#[derive(Clone, Copy, Debug)]
pub struct RoomSize {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct PortalConfig {
    pub position: Vec3,
    pub target: RoomId,
}

/// Minigame play area inside a room. `wall_height` of zero means the zone
/// is a trigger region only, with no containment walls.
#[derive(Clone, Copy, Debug)]
pub struct ZoneConfig {
    pub center: Vec3,
    pub size: Vec3,
    pub wall_height: f32,
}

#[derive(Clone, Debug)]
pub struct RoomConfig {
    pub id: RoomId,
    pub size: RoomSize,
    pub spawn: Vec3,
    pub portals: Vec<PortalConfig>,
    pub zone: Option<ZoneConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("room {0:?} has non-positive dimensions")]
    DegenerateSize(RoomId),
    #[error("room {0:?} spawn point lies outside the room bounds")]
    SpawnOutOfBounds(RoomId),
}

impl RoomConfig {
    /// Layout tables for the four rooms of the hub world.
    pub fn get(id: RoomId) -> RoomConfig {
        match id {
            RoomId::Hub => RoomConfig {
                id,
                size: RoomSize {
                    width: 30.0,
                    height: 8.0,
                    depth: 30.0,
                },
                spawn: Vec3::new(0.0, player::SPAWN_HEIGHT, 0.0),
                portals: vec![
                    PortalConfig {
                        position: Vec3::new(0.0, 1.8, -14.0),
                        target: RoomId::Dice,
                    },
                    PortalConfig {
                        position: Vec3::new(14.0, 1.8, 0.0),
                        target: RoomId::Basketball,
                    },
                    PortalConfig {
                        position: Vec3::new(0.0, 1.8, 14.0),
                        target: RoomId::Sequence,
                    },
                ],
                zone: None,
            },
            RoomId::Dice => RoomConfig {
                id,
                size: RoomSize {
                    width: 20.0,
                    height: 6.0,
                    depth: 20.0,
                },
                spawn: Vec3::new(0.0, player::SPAWN_HEIGHT, 7.0),
                portals: vec![PortalConfig {
                    position: Vec3::new(0.0, 1.8, 9.0),
                    target: RoomId::Hub,
                }],
                zone: Some(ZoneConfig {
                    center: Vec3::new(0.0, 0.0, -4.0),
                    size: Vec3::new(4.0, 0.1, 4.0),
                    wall_height: 2.0,
                }),
            },
            RoomId::Basketball => RoomConfig {
                id,
                size: RoomSize {
                    width: 20.0,
                    height: 8.0,
                    depth: 20.0,
                },
                spawn: Vec3::new(0.0, player::SPAWN_HEIGHT, 7.0),
                portals: vec![PortalConfig {
                    position: Vec3::new(0.0, 1.8, 9.0),
                    target: RoomId::Hub,
                }],
                zone: Some(ZoneConfig {
                    center: Vec3::new(0.0, 0.0, -2.0),
                    size: Vec3::new(12.0, 0.1, 10.0),
                    wall_height: 4.0,
                }),
            },
            RoomId::Sequence => RoomConfig {
                id,
                size: RoomSize {
                    width: 20.0,
                    height: 6.0,
                    depth: 20.0,
                },
                spawn: Vec3::new(0.0, player::SPAWN_HEIGHT, 7.0),
                portals: vec![PortalConfig {
                    position: Vec3::new(0.0, 1.8, 9.0),
                    target: RoomId::Hub,
                }],
                zone: Some(ZoneConfig {
                    center: Vec3::new(0.0, 0.0, -4.0),
                    size: Vec3::new(6.0, 0.1, 6.0),
                    wall_height: 0.0,
                }),
            },
        }
    }

    /// Fail fast before any body is spawned for this room.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let RoomSize {
            width,
            height,
            depth,
        } = self.size;
        if width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            return Err(ConfigError::DegenerateSize(self.id));
        }
        let inside = self.spawn.x.abs() <= width / 2.0
            && self.spawn.z.abs() <= depth / 2.0
            && self.spawn.y >= 0.0
            && self.spawn.y <= height;
        if !inside {
            return Err(ConfigError::SpawnOutOfBounds(self.id));
        }
        Ok(())
    }
}
