use glam::{Quat, Vec3};

/// World-space transform of a rigid body.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Linear velocity in world space.
#[derive(Clone, Copy, Debug, Default)]
pub struct Velocity(pub Vec3);

/// Angular velocity in world space (axis scaled by rad/s). Bodies without
/// this component never rotate, which doubles as cannon-style fixed rotation
/// for the player capsule.
#[derive(Clone, Copy, Debug, Default)]
pub struct AngularVelocity(pub Vec3);

/// Body mass in kilograms. Only meaningful on dynamic bodies.
#[derive(Clone, Copy, Debug)]
pub struct Mass(pub f32);

/// How the integrator and solver treat a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyMode {
    /// Immovable, infinite mass for collision response.
    Static,
    /// Fully simulated.
    Dynamic,
    /// Moved only by direct writes (hand anchor, carried bodies).
    Kinematic,
}

/// Per-step velocity damping, `vel *= (1 - damping * dt)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}

/// Collision shape attached to a body. Construct through the checked
/// constructors; a degenerate shape is a caller bug, not a runtime state.
#[derive(Clone, Copy, Debug)]
pub enum Collider {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Plane { normal: Vec3, offset: f32 },
}

impl Collider {
    pub fn sphere(radius: f32) -> Self {
        assert!(radius > 0.0, "sphere radius must be positive, got {radius}");
        Collider::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        assert!(
            half_extents.cmpgt(Vec3::ZERO).all(),
            "box half extents must be positive, got {half_extents}"
        );
        Collider::Box { half_extents }
    }

    pub fn plane(normal: Vec3, offset: f32) -> Self {
        assert!(
            normal.length_squared() > 1e-12,
            "plane normal must be non-zero"
        );
        Collider::Plane {
            normal: normal.normalize(),
            offset,
        }
    }

    /// Radius of the bounding sphere, used by the coarse box-box test.
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Collider::Sphere { radius } => *radius,
            Collider::Box { half_extents } => half_extents.length(),
            Collider::Plane { .. } => f32::INFINITY,
        }
    }
}

/// Marker: the player can pick this body up and carry it.
pub struct Pickupable;

/// Marker: currently carried by the player. The integrator and the solver
/// both skip held bodies; the carry system drives them kinematically.
pub struct Held;
