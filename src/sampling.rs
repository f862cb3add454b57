use std::f32::consts::PI;

use rand::Rng;
use rand_distr::{Distribution as _, UnitDisc};

use crate::geometry::{FloatType, WorldVector};

/// Tangent and bitangent completing `normal` to an orthonormal frame.
/// Picks whichever cross-product construction stays away from degeneracy
/// when the normal is close to a coordinate axis.
pub fn coordinate_system(normal: &WorldVector) -> (WorldVector, WorldVector) {
    let tangent = if normal.x.abs() > normal.y.abs() {
        WorldVector::new(normal.z, 0.0, -normal.x).normalize()
    } else {
        WorldVector::new(0.0, -normal.z, normal.y).normalize()
    };
    let bitangent = normal.cross(&tangent);
    (tangent, bitangent)
}

/// Cosine-weighted direction on the hemisphere around local +y.
pub fn cosine_sample_hemisphere(r1: FloatType, r2: FloatType) -> WorldVector {
    let cos_theta = r1.sqrt();
    let sin_theta = (1.0 - r1).max(0.0).sqrt();
    let phi = 2.0 * PI * r2;
    WorldVector::new(sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin())
}

/// Uniform point on the base of a cone of unit height around local +y with
/// base radius `base_radius`. Not normalized.
pub fn sample_cone_base(base_radius: FloatType, rng: &mut impl Rng) -> WorldVector {
    let [x, z]: [FloatType; 2] = UnitDisc.sample(rng);
    WorldVector::new(base_radius * x, 1.0, base_radius * z)
}

/// Maps a local-frame sample (y along `normal`) into world space.
pub fn local_to_world(
    sample: &WorldVector,
    normal: &WorldVector,
    tangent: &WorldVector,
    bitangent: &WorldVector,
) -> WorldVector {
    bitangent * sample.x + normal * sample.y + tangent * sample.z
}

/// Mirror `incident` about `normal`.
pub fn reflect(incident: &WorldVector, normal: &WorldVector) -> WorldVector {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Refract `incident` through a surface with relative index `eta`,
/// or None under total internal reflection.
pub fn refract(
    incident: &WorldVector,
    normal: &WorldVector,
    eta: FloatType,
) -> Option<WorldVector> {
    let cos_i = normal.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        None
    } else {
        Some(eta * incident - (eta * cos_i + k.sqrt()) * normal)
    }
}
