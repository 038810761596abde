use glam::{Quat, Vec3};

/// Colinearity threshold: `1 - |dot|` at or below this counts as (anti-)parallel.
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;
/// Above this `|dot|` between the model axis and world up, the target direction is used as the
/// pitch reference instead (the cross product with up degenerates).
pub const PITCH_REFERENCE_SUBSTITUTION_DOT: f32 = 0.7;
/// Cosine (roughly 11.4 degrees) under which a yaw correction follows the pitch correction.
pub const PARALLEL_COSINE_THRESHOLD: f32 = 0.98;

const WORLD_UP: Vec3 = Vec3::Z;

/// Finds an alignment rotation for `actor_rotation` that makes the model-space `model_axis` point
/// along `world_normal`.
///
/// The correction is a pitch around a local axis followed by an optional yaw around world Z, which
/// keeps the roll around the aligned axis instead of introducing the twist a single shortest-arc
/// rotation would. Only the anti-parallel case falls back to a shortest arc.
pub fn find_actor_alignment_rotation(actor_rotation: Quat, model_axis: Vec3, world_normal: Vec3) -> Quat {
    let actor_rotation = actor_rotation.normalize();
    let model_axis = model_axis.normalize_or_zero();
    let world_normal = world_normal.normalize_or_zero();

    let inverse_rotation = actor_rotation.inverse();
    let dest_normal_model = inverse_rotation * world_normal;
    let transformed_axis = actor_rotation * model_axis;

    let dot = world_normal.dot(transformed_axis);
    if 1.0 - dot.abs() <= KINDA_SMALL_NUMBER {
        if dot < 0.0 {
            return actor_rotation * Quat::from_rotation_arc(model_axis, dest_normal_model);
        }
        return actor_rotation;
    }

    let reference = pitch_reference_axis(model_axis, inverse_rotation * WORLD_UP, dest_normal_model);
    let pitch_axis = reference.cross(model_axis).normalize_or_zero();
    let pitch = safe_acos(reference.dot(dest_normal_model)) - safe_acos(reference.dot(model_axis));
    let mut delta = Quat::from_axis_angle(pitch_axis, pitch).normalize();

    let pitched = actor_rotation * delta;
    let corrected_axis = pitched * model_axis;
    if !coincident(world_normal, corrected_axis, PARALLEL_COSINE_THRESHOLD) {
        let yaw = azimuth(world_normal) - azimuth(corrected_axis);
        // world Z expressed in the pitched local frame
        let yaw_axis = pitched.inverse() * WORLD_UP;
        delta *= Quat::from_axis_angle(yaw_axis, -yaw);
    }

    actor_rotation * delta
}

/// Axis against which the pitch is measured, in model space.
pub(crate) fn pitch_reference_axis(model_axis: Vec3, up_model: Vec3, dest_normal_model: Vec3) -> Vec3 {
    if model_axis.dot(up_model).abs() > PITCH_REFERENCE_SUBSTITUTION_DOT {
        dest_normal_model
    } else {
        up_model
    }
}

// Azimuth in the world XY plane, measured from +Y towards +X.
fn azimuth(v: Vec3) -> f32 {
    v.x.atan2(v.y)
}

fn coincident(a: Vec3, b: Vec3, cosine_threshold: f32) -> bool {
    a.dot(b) >= cosine_threshold
}

fn safe_acos(cosine: f32) -> f32 {
    cosine.clamp(-1.0, 1.0).acos()
}

/// How a factory orients its actors when they are dropped onto a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceAlignment {
    Disabled,
    Axis(Vec3),
}

impl SurfaceAlignment {
    /// Local -X against the surface normal, so the actor looks at the surface.
    pub const FACE_SURFACE: SurfaceAlignment = SurfaceAlignment::Axis(Vec3::NEG_X);
    /// Local +Z along the surface normal, so the actor stands on the surface.
    pub const STAND_ON_SURFACE: SurfaceAlignment = SurfaceAlignment::Axis(Vec3::Z);

    pub fn align(self, surface_normal: Vec3, rotation: Quat) -> Quat {
        match self {
            SurfaceAlignment::Disabled => Quat::IDENTITY,
            SurfaceAlignment::Axis(axis) => find_actor_alignment_rotation(rotation, axis, surface_normal),
        }
    }

    pub fn axis(self) -> Option<Vec3> {
        match self {
            SurfaceAlignment::Disabled => None,
            SurfaceAlignment::Axis(axis) => Some(axis),
        }
    }
}
