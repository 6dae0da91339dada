use glam::{Quat, Vec3};
use hecs::{Entity, World};

use crate::components::{AngularVelocity, BodyMode, Collider, Held, Mass, Transform, Velocity};
use crate::physics::materials::{ContactTable, Surface};

/// Below this approach speed a contact is treated as resting (no bounce),
/// otherwise stacked bodies jitter forever.
const REST_VELOCITY_THRESHOLD: f32 = 0.5;
/// Angular velocity bleed applied to a body for every substep it spends in
/// contact. Without it free dice spin on a corner for a long time.
const ROLLING_RESISTANCE: f32 = 0.8;

struct BodyEntry {
    entity: Entity,
    position: Vec3,
    rotation: Quat,
    collider: Collider,
    mode: BodyMode,
    surface: Surface,
    inv_mass: f32,
    inv_inertia: f32,
}

/// One contact. `normal` always points toward body `a` (the direction `a`
/// must be pushed); `a` is always dynamic.
struct Contact {
    a: Entity,
    b: Entity,
    normal: Vec3,
    depth: f32,
    point: Vec3,
    a_inv_mass: f32,
    a_inv_inertia: f32,
    b_inv_mass: f32,
    surface_a: Surface,
    surface_b: Surface,
    both_dynamic: bool,
}

/// Scalar inverse inertia: solid sphere 2mr²/5, solid cube ms²/6 using the
/// largest extent. Coarse but adequate for dice tumble and ball spin.
fn scalar_inv_inertia(collider: &Collider, mass: f32) -> f32 {
    if mass <= 0.0 {
        return 0.0;
    }
    let inertia = match collider {
        Collider::Sphere { radius } => 0.4 * mass * radius * radius,
        Collider::Box { half_extents } => {
            let side = half_extents.max_element() * 2.0;
            mass * side * side / 6.0
        }
        Collider::Plane { .. } => return 0.0,
    };
    if inertia > 1e-12 {
        1.0 / inertia
    } else {
        0.0
    }
}

const BOX_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
];

/// Penetration of a point into an axis-aligned box, resolved along the axis
/// of least overlap. Returns (normal out of the box, depth).
fn point_vs_aabb(point: Vec3, center: Vec3, half: Vec3) -> Option<(Vec3, f32)> {
    let rel = point - center;
    let overlap = half - rel.abs();
    if overlap.cmple(Vec3::ZERO).any() {
        return None;
    }
    let (axis, sign, depth) = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        (Vec3::X, rel.x.signum(), overlap.x)
    } else if overlap.y <= overlap.z {
        (Vec3::Y, rel.y.signum(), overlap.y)
    } else {
        (Vec3::Z, rel.z.signum(), overlap.z)
    };
    Some((axis * sign, depth))
}

fn push_contact(contacts: &mut Vec<Contact>, a: &BodyEntry, b: &BodyEntry, normal: Vec3, depth: f32, point: Vec3) {
    contacts.push(Contact {
        a: a.entity,
        b: b.entity,
        normal,
        depth,
        point,
        a_inv_mass: a.inv_mass,
        a_inv_inertia: a.inv_inertia,
        b_inv_mass: b.inv_mass,
        surface_a: a.surface,
        surface_b: b.surface,
        both_dynamic: b.mode == BodyMode::Dynamic,
    });
}

fn sphere_vs_plane(a: &BodyEntry, b: &BodyEntry, radius: f32, normal: Vec3, offset: f32, contacts: &mut Vec<Contact>) {
    let dist = a.position.dot(normal) - offset;
    let depth = radius - dist;
    if depth > 0.0 {
        push_contact(contacts, a, b, normal, depth, a.position - normal * radius);
    }
}

fn sphere_vs_aabb(a: &BodyEntry, b: &BodyEntry, radius: f32, half: Vec3, contacts: &mut Vec<Contact>) {
    let closest = (a.position - b.position).clamp(-half, half) + b.position;
    let diff = a.position - closest;
    let dist = diff.length();
    if dist > 1e-6 {
        let depth = radius - dist;
        if depth > 0.0 {
            push_contact(contacts, a, b, diff / dist, depth, closest);
        }
    } else if let Some((normal, depth)) = point_vs_aabb(a.position, b.position, half) {
        // Center is inside the box; push out along the least-overlap axis.
        push_contact(contacts, a, b, normal, depth + radius, a.position);
    }
}

fn sphere_vs_sphere(a: &BodyEntry, b: &BodyEntry, ra: f32, rb: f32, contacts: &mut Vec<Contact>) {
    let diff = a.position - b.position;
    let dist = diff.length();
    let depth = (ra + rb) - dist;
    if depth > 0.0 {
        let normal = if dist > 1e-6 { diff / dist } else { Vec3::Y };
        push_contact(contacts, a, b, normal, depth, a.position - normal * ra);
    }
}

/// Oriented dynamic box against a static plane or box, one contact per
/// penetrating corner so the response produces torque and the box tumbles.
/// Only the deepest corner carries positional correction; a flat landing on
/// four corners must not get pushed out four times.
fn box_vs_static(a: &BodyEntry, b: &BodyEntry, half_a: Vec3, contacts: &mut Vec<Contact>) {
    let mut deepest: Option<usize> = None;
    let mut max_depth = 0.0_f32;
    for corner in BOX_CORNERS {
        let world_corner = a.position + a.rotation * (corner * half_a);
        let hit = match b.collider {
            Collider::Plane { normal, offset } => {
                let d = world_corner.dot(normal) - offset;
                (d < 0.0).then_some((normal, -d))
            }
            Collider::Box { half_extents } => point_vs_aabb(world_corner, b.position, half_extents),
            Collider::Sphere { .. } => None,
        };
        if let Some((normal, depth)) = hit {
            push_contact(contacts, a, b, normal, 0.0, world_corner);
            if depth > max_depth {
                max_depth = depth;
                deepest = Some(contacts.len() - 1);
            }
        }
    }
    if let Some(index) = deepest {
        contacts[index].depth = max_depth;
    }
}

fn test_pair(a: &BodyEntry, b: &BodyEntry, contacts: &mut Vec<Contact>) {
    // Canonicalize: the first body of a contact is dynamic.
    let (a, b) = if a.mode == BodyMode::Dynamic {
        (a, b)
    } else {
        (b, a)
    };

    match (&a.collider, &b.collider) {
        (Collider::Sphere { radius }, Collider::Plane { normal, offset }) => {
            sphere_vs_plane(a, b, *radius, *normal, *offset, contacts)
        }
        (Collider::Sphere { radius }, Collider::Box { half_extents }) if !matches!(b.mode, BodyMode::Dynamic) => {
            sphere_vs_aabb(a, b, *radius, *half_extents, contacts)
        }
        (Collider::Sphere { radius: ra }, Collider::Sphere { radius: rb }) => {
            sphere_vs_sphere(a, b, *ra, *rb, contacts)
        }
        (Collider::Box { half_extents }, Collider::Plane { .. })
        | (Collider::Box { half_extents }, Collider::Box { .. })
            if !matches!(b.mode, BodyMode::Dynamic) =>
        {
            box_vs_static(a, b, *half_extents, contacts)
        }
        // Remaining dynamic-vs-dynamic combinations collapse to bounding
        // spheres; good enough for dice bumping each other or the player.
        _ if b.mode == BodyMode::Dynamic => {
            sphere_vs_sphere(
                a,
                b,
                a.collider.bounding_radius(),
                b.collider.bounding_radius(),
                contacts,
            );
        }
        _ => {}
    }
}

fn resolve(world: &mut World, contact: &Contact, materials: &ContactTable, dt: f32) {
    let params = materials.lookup(contact.surface_a, contact.surface_b);
    let n = contact.normal;

    // Positional correction.
    if contact.depth > 0.0 {
        let (push_a, push_b) = if contact.both_dynamic {
            (contact.depth * 0.5, contact.depth * 0.5)
        } else {
            (contact.depth, 0.0)
        };
        if let Ok(mut transform) = world.get::<&mut Transform>(contact.a) {
            transform.position += n * push_a;
        }
        if push_b > 0.0 {
            if let Ok(mut transform) = world.get::<&mut Transform>(contact.b) {
                transform.position -= n * push_b;
            }
        }
    }

    if contact.both_dynamic {
        resolve_dynamic_pair(world, contact, params.friction, params.restitution);
        return;
    }

    let position = match world.get::<&Transform>(contact.a) {
        Ok(transform) => transform.position,
        Err(_) => return,
    };
    let vel = match world.get::<&Velocity>(contact.a) {
        Ok(v) => v.0,
        Err(_) => return,
    };
    let ang = world
        .get::<&AngularVelocity>(contact.a)
        .map(|a| a.0)
        .ok();

    let r = contact.point - position;
    let v_point = vel + ang.map(|w| w.cross(r)).unwrap_or(Vec3::ZERO);
    let vn = v_point.dot(n);
    if vn >= 0.0 {
        return;
    }

    let e = if -vn < REST_VELOCITY_THRESHOLD {
        0.0
    } else {
        params.restitution
    };

    let rn = r.cross(n);
    let denom = contact.a_inv_mass + contact.a_inv_inertia * rn.length_squared();
    if denom < 1e-9 {
        return;
    }
    let j = -(1.0 + e) * vn / denom;

    let mut new_vel = vel + n * (j * contact.a_inv_mass);
    let mut new_ang = ang.map(|w| w + rn * (j * contact.a_inv_inertia));

    // Coulomb friction at the contact point, clamped so it can only stop
    // tangential motion, never reverse it.
    let v_tangent = v_point - vn * n;
    let tangent_speed = v_tangent.length();
    if tangent_speed > 1e-6 {
        let t = v_tangent / tangent_speed;
        let rt = r.cross(t);
        let denom_t = contact.a_inv_mass + contact.a_inv_inertia * rt.length_squared();
        if denom_t > 1e-9 {
            let jt = (tangent_speed / denom_t).min(params.friction * j);
            new_vel -= t * (jt * contact.a_inv_mass);
            new_ang = new_ang.map(|w| w - rt * (jt * contact.a_inv_inertia));
        }
    }

    if let Some(w) = new_ang.as_mut() {
        *w /= 1.0 + ROLLING_RESISTANCE * dt;
    }

    if let Ok(mut v) = world.get::<&mut Velocity>(contact.a) {
        v.0 = new_vel;
    }
    if let (Ok(mut w), Some(new_w)) = (world.get::<&mut AngularVelocity>(contact.a), new_ang) {
        w.0 = new_w;
    }
}

/// Linear-only response between two dynamic bodies, split evenly.
fn resolve_dynamic_pair(world: &mut World, contact: &Contact, friction: f32, restitution: f32) {
    let va = match world.get::<&Velocity>(contact.a) {
        Ok(v) => v.0,
        Err(_) => return,
    };
    let vb = match world.get::<&Velocity>(contact.b) {
        Ok(v) => v.0,
        Err(_) => return,
    };
    let n = contact.normal;
    let rel = va - vb;
    let vn = rel.dot(n);
    if vn >= 0.0 {
        return;
    }

    let e = if -vn < REST_VELOCITY_THRESHOLD {
        0.0
    } else {
        restitution
    };
    let inv_sum = contact.a_inv_mass + contact.b_inv_mass;
    if inv_sum < 1e-9 {
        return;
    }
    let j = -(1.0 + e) * vn / inv_sum;

    let v_tangent = rel - vn * n;
    let tangent_speed = v_tangent.length();
    let friction_impulse = if tangent_speed > 1e-6 {
        let jt = (tangent_speed / inv_sum).min(friction * j);
        (v_tangent / tangent_speed) * jt
    } else {
        Vec3::ZERO
    };

    if let Ok(mut v) = world.get::<&mut Velocity>(contact.a) {
        v.0 += (n * j - friction_impulse) * contact.a_inv_mass;
    }
    if let Ok(mut v) = world.get::<&mut Velocity>(contact.b) {
        v.0 -= (n * j - friction_impulse) * contact.b_inv_mass;
    }
}

/// Detect and resolve every contact for one substep. Returns the number of
/// contacts processed.
pub(super) fn collide(world: &mut World, materials: &ContactTable, dt: f32) -> usize {
    let mut entries: Vec<BodyEntry> = Vec::new();
    for (entity, (transform, collider, mode, surface, mass, held, ang)) in world
        .query::<(
            &Transform,
            &Collider,
            &BodyMode,
            &Surface,
            Option<&Mass>,
            Option<&Held>,
            Option<&AngularVelocity>,
        )>()
        .iter()
    {
        if held.is_some() {
            continue;
        }
        let mass = mass.map(|m| m.0).unwrap_or(0.0);
        let (inv_mass, inv_inertia) = if *mode == BodyMode::Dynamic && mass > 0.0 {
            let inv_inertia = if ang.is_some() {
                scalar_inv_inertia(collider, mass)
            } else {
                // No angular state means fixed rotation: torque-immune.
                0.0
            };
            (1.0 / mass, inv_inertia)
        } else {
            (0.0, 0.0)
        };
        entries.push(BodyEntry {
            entity,
            position: transform.position,
            rotation: transform.rotation,
            collider: *collider,
            mode: *mode,
            surface: *surface,
            inv_mass,
            inv_inertia,
        });
    }

    // Brute-force broadphase; body counts here stay well under a hundred.
    let mut contacts = Vec::new();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (a, b) = (&entries[i], &entries[j]);
            if a.mode != BodyMode::Dynamic && b.mode != BodyMode::Dynamic {
                continue;
            }
            test_pair(a, b, &mut contacts);
        }
    }

    for contact in &contacts {
        resolve(world, contact, materials, dt);
    }
    contacts.len()
}
