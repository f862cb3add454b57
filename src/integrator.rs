use std::f32::consts::PI;

use rand::Rng;

use crate::geometry::{EPSILON, FloatType, Ray, WorldPoint, WorldVector};
use crate::sampling::{
    coordinate_system, cosine_sample_hemisphere, local_to_world, reflect, refract,
    sample_cone_base,
};
use crate::scene::{Color, Scene};

/// Recursive Monte-Carlo radiance estimator.
///
/// Russian roulette starts once the bounce depth exceeds `min_bounces`;
/// recursion always stops past `max_bounces`.
#[derive(Copy, Clone, Debug)]
pub struct PathTracer {
    pub min_bounces: u32,
    pub max_bounces: u32,
}

impl Default for PathTracer {
    fn default() -> Self {
        PathTracer {
            min_bounces: 20,
            max_bounces: 30,
        }
    }
}

impl PathTracer {
    /// Estimated radiance arriving at `origin` from `direction`.
    /// `direction` must be normalized; `current_ior` is the refractive index
    /// of the medium the ray travels through.
    pub fn radiance(
        &self,
        scene: &Scene,
        origin: WorldPoint,
        direction: WorldVector,
        current_ior: FloatType,
        bounce: u32,
        rng: &mut impl Rng,
    ) -> Color {
        // Step off the surface we may have been spawned from.
        let ray = Ray::new(origin + direction * EPSILON, direction);
        let Some(intersection) = scene.intersect(&ray) else {
            return Color::zeros();
        };

        let material = &intersection.primitive.material;
        if intersection.primitive.is_light() {
            return material.emission;
        }

        // Russian roulette. Survivors are reweighted by the survival
        // probability so the estimator stays unbiased in expectation.
        let mut roulette_weight = 1.0;
        if bounce > self.min_bounces {
            if bounce > self.max_bounces {
                return Color::zeros();
            }
            let survival = max3(&material.color).min(1.0);
            if survival <= 0.0 || rng.random::<FloatType>() > survival {
                return Color::zeros();
            }
            roulette_weight = 1.0 / survival;
        }

        let hit_pos = intersection.position;
        let normal = intersection.primitive.normal_at(&hit_pos);

        // Direct light: one sample per emissive primitive, visibility via a
        // shadow ray that must reach that same primitive.
        let mut direct_diffuse = Color::zeros();
        let mut direct_specular = Color::zeros();
        for light in scene.lights() {
            let light_pos = light.random_point(rng);
            let light_vec = light_pos - hit_pos;
            let light_dist = light_vec.norm();
            if light_dist <= EPSILON {
                continue;
            }
            let light_dir = light_vec / light_dist;

            let shadow_ray = Ray::new(hit_pos + light_dir * EPSILON, light_dir);
            let Some(light_hit) = scene.intersect(&shadow_ray) else {
                continue;
            };
            if !std::ptr::eq(light_hit.primitive, light) {
                continue;
            }

            let falloff = 4.0 * PI * light_dist * light_dist;
            let cos_term = light_dir.dot(&normal).max(0.0);
            direct_diffuse += light.material.emission * (cos_term / falloff);

            // Specular direct light only contributes on the camera-facing
            // bounce; deeper bounces carry it through the indirect term.
            if bounce == 0 {
                let reflected = reflect(&light_dir, &normal);
                let phong = reflected
                    .dot(&direction)
                    .max(0.0)
                    .powf(material.shininess);
                direct_specular += light.material.emission * (phong * cos_term / falloff);
            }
        }
        let direct_diffuse = direct_diffuse.map(|c| c.clamp(0.0, 1.0));
        let direct_specular = direct_specular.map(|c| c.clamp(0.0, 1.0));

        // Indirect light: Fresnel split for dielectrics, otherwise one
        // stochastic bounce through either the diffuse or the glossy lobe.
        let mut indirect = Color::zeros();
        if material.transmittance.iter().any(|&t| t > 0.0) {
            let kr = fresnel(&direction, &normal, material.refractive_index);
            let is_inside = direction.dot(&normal) > 0.0;
            let bias = EPSILON * normal;
            // Exiting back into air the relative index is the medium's own;
            // entering it is the ratio of the carried index to the surface's.
            let eta = if is_inside {
                current_ior
            } else {
                current_ior / material.refractive_index
            };
            let next_ior = if is_inside {
                1.0
            } else {
                material.refractive_index
            };
            let oriented_normal = if is_inside { -normal } else { normal };
            let start = if is_inside { hit_pos + bias } else { hit_pos - bias };

            let mut refraction = Color::zeros();
            if kr < 1.0 {
                if let Some(refracted) = refract(&direction, &oriented_normal, eta) {
                    refraction = self.radiance(
                        scene,
                        start,
                        refracted.normalize(),
                        next_ior,
                        bounce + 1,
                        rng,
                    );
                }
            }
            let reflected = reflect(&direction, &oriented_normal).normalize();
            let reflection = self.radiance(scene, start, reflected, next_ior, bounce + 1, rng);
            indirect += kr * reflection + (1.0 - kr) * refraction;
        } else {
            let diffuse_weight = material.diffuse.mean();
            let specular_weight = material.specular.mean();
            let total_weight = diffuse_weight + specular_weight;
            let diffuse_probability = if total_weight > 0.0 {
                diffuse_weight / total_weight
            } else {
                1.0
            };

            if rng.random::<FloatType>() < diffuse_probability {
                let (tangent, bitangent) = coordinate_system(&normal);
                let sample = cosine_sample_hemisphere(rng.random(), rng.random());
                let bounce_dir = local_to_world(&sample, &normal, &tangent, &bitangent);
                indirect += self.radiance(
                    scene,
                    hit_pos,
                    bounce_dir,
                    material.refractive_index,
                    bounce + 1,
                    rng,
                );
            } else {
                let reflected = reflect(&direction, &normal);
                let (tangent, bitangent) = coordinate_system(&reflected);
                let sample = sample_cone_base(10.0 / material.shininess, rng);
                let bounce_dir =
                    local_to_world(&sample, &reflected, &tangent, &bitangent).normalize();
                indirect += self.radiance(
                    scene,
                    hit_pos,
                    bounce_dir,
                    material.refractive_index,
                    bounce + 1,
                    rng,
                );
            }
        }
        // Rare high-contribution paths would otherwise blow up the variance.
        let indirect = indirect.map(|c| c.clamp(0.0, 10.0));

        let combined = material.emission
            + material.color.component_mul(
                &(material.diffuse.component_mul(&direct_diffuse)
                    + material.ambient.component_mul(&indirect)
                    + material.specular.component_mul(&direct_specular)),
            );
        roulette_weight * combined
    }
}

/// Fraction of light reflected at a dielectric interface with refractive
/// index `ior`, for incident direction `incident` against `normal`.
/// Unpolarized: the average of the s- and p-polarized reflectances.
pub fn fresnel(incident: &WorldVector, normal: &WorldVector, ior: FloatType) -> FloatType {
    let cos_i = incident.dot(normal).clamp(-1.0, 1.0);
    let (eta_i, eta_t) = if cos_i > 0.0 { (ior, 1.0) } else { (1.0, ior) };

    // Snell's law; sin >= 1 is total internal reflection.
    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    let cos_i = cos_i.abs();
    let r_s = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_p = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);
    (r_s * r_s + r_p * r_p) / 2.0
}

fn max3(color: &Color) -> FloatType {
    color.x.max(color.y).max(color.z)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::{Material, Object, Primitive};
    use assert2::assert;
    use rand::{SeedableRng as _, rngs::SmallRng};
    use test_strategy::proptest;

    #[proptest]
    fn fresnel_conserves_energy(
        #[strategy(-1.0f32..1.0)] x: f32,
        #[strategy(-1.0f32..1.0)] y: f32,
        #[strategy(1.0f32..2.5)] ior: f32,
    ) {
        let v = WorldVector::new(x, y, 0.3);
        let incident = v.normalize();
        let normal = WorldVector::new(0.0, 1.0, 0.0);

        let kr = fresnel(&incident, &normal, ior);
        assert!((0.0..=1.0).contains(&kr));
    }

    #[test]
    fn fresnel_total_internal_reflection() {
        // Leaving a dense medium at a grazing angle.
        let incident = WorldVector::new(0.9, 0.1, 0.0).normalize();
        let normal = WorldVector::new(0.0, 1.0, 0.0);
        assert!(fresnel(&incident, &normal, 1.5) == 1.0);
    }

    #[test]
    fn fresnel_normal_incidence_matches_the_closed_form() {
        let incident = WorldVector::new(0.0, -1.0, 0.0);
        let normal = WorldVector::new(0.0, 1.0, 0.0);
        let kr = fresnel(&incident, &normal, 1.5);
        // ((n1 - n2) / (n1 + n2))^2 = (0.5 / 2.5)^2
        assert!((kr - 0.04).abs() < 1e-4);
    }

    fn light_and_plane(emission: f32) -> Scene {
        let mut scene = Scene::new();

        // Square light at y = 1 spanning [-0.25, 0.25]^2.
        let light = Material::emissive(Color::repeat(emission));
        scene.push_object(Object::new(vec![
            Primitive::triangle(
                [-0.25, 1.0, -0.25].into(),
                [0.25, 1.0, -0.25].into(),
                [0.25, 1.0, 0.25].into(),
                light.clone(),
            ),
            Primitive::triangle(
                [-0.25, 1.0, -0.25].into(),
                [0.25, 1.0, 0.25].into(),
                [-0.25, 1.0, 0.25].into(),
                light,
            ),
        ]));

        // Large white diffuse plane at y = 0. Winding chosen so the face
        // normal points up toward the light.
        let white = Material::opaque(Color::repeat(0.75), 10.0, 0.5, 0.0, 1.0);
        scene.push_object(Object::new(vec![
            Primitive::triangle(
                [-20.0, 0.0, -20.0].into(),
                [20.0, 0.0, -20.0].into(),
                [20.0, 0.0, 20.0].into(),
                white.clone(),
            ),
            Primitive::triangle(
                [-20.0, 0.0, -20.0].into(),
                [20.0, 0.0, 20.0].into(),
                [-20.0, 0.0, 20.0].into(),
                white,
            ),
        ]));

        scene
    }

    fn average_radiance(
        tracer: &PathTracer,
        scene: &Scene,
        origin: WorldPoint,
        direction: WorldVector,
        samples: u32,
        seed: u64,
    ) -> Color {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut sum = Color::zeros();
        for _ in 0..samples {
            sum += tracer.radiance(scene, origin, direction, 1.0, 0, &mut rng);
        }
        sum / (samples as FloatType)
    }

    #[test]
    fn empty_scene_is_black() {
        let scene = Scene::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let radiance = PathTracer::default().radiance(
            &scene,
            [0.0, 0.0, 0.0].into(),
            WorldVector::new(0.0, 0.0, 1.0),
            1.0,
            0,
            &mut rng,
        );
        assert!(radiance == Color::zeros());
    }

    #[test]
    fn scene_without_lights_is_black() {
        let mut scene = Scene::new();
        scene.push_object(Object::new(vec![Primitive::sphere(
            [0.0, 0.0, 5.0].into(),
            1.0,
            Material::opaque(Color::repeat(0.75), 10.0, 0.5, 0.06, 0.44),
        )]));

        let tracer = PathTracer {
            min_bounces: 0,
            max_bounces: 3,
        };
        let radiance = average_radiance(
            &tracer,
            &scene,
            [0.0, 0.0, 0.0].into(),
            WorldVector::new(0.0, 0.0, 1.0),
            50,
            1,
        );
        assert!(radiance == Color::zeros());
    }

    #[test]
    fn direct_view_of_a_light_returns_its_emission() {
        let scene = light_and_plane(2.0);
        let mut rng = SmallRng::seed_from_u64(0);
        let radiance = PathTracer::default().radiance(
            &scene,
            [0.0, 0.5, 0.0].into(),
            WorldVector::new(0.0, 1.0, 0.0),
            1.0,
            0,
            &mut rng,
        );
        assert!(radiance == Color::repeat(2.0));
    }

    #[test]
    fn brightest_point_is_under_the_light_with_monotone_falloff() {
        let scene = light_and_plane(2.0);
        // Direct lighting only: any deeper bounce terminates immediately.
        let tracer = PathTracer {
            min_bounces: 0,
            max_bounces: 0,
        };

        let mut previous = FloatType::INFINITY;
        for (i, x) in [0.0, 0.4, 0.8, 1.2].into_iter().enumerate() {
            let radiance = average_radiance(
                &tracer,
                &scene,
                [x, 0.5, 0.0].into(),
                WorldVector::new(0.0, -1.0, 0.0),
                2000,
                100 + i as u64,
            );
            let brightness = radiance.mean();
            assert!(brightness > 0.0);
            assert!(brightness < previous);
            previous = brightness;
        }
    }

    #[test]
    fn russian_roulette_matches_the_depth_capped_estimate() {
        let mut scene = light_and_plane(2.0);
        // A matte sphere on the plane gives the paths something to bounce
        // between.
        scene.push_object(Object::new(vec![Primitive::sphere(
            [0.6, 0.3, 0.0].into(),
            0.3,
            Material::opaque(Color::repeat(0.75), 10.0, 0.5, 0.06, 0.44),
        )]));

        let origin = WorldPoint::new(0.0, 0.5, 0.0);
        let direction = WorldVector::new(0.3, -1.0, 0.0).normalize();

        let with_roulette = PathTracer {
            min_bounces: 2,
            max_bounces: 16,
        };
        // min == max disables the stochastic test: every path runs to the
        // hard cap and terminates there deterministically.
        let depth_capped = PathTracer {
            min_bounces: 16,
            max_bounces: 16,
        };

        let a = average_radiance(&with_roulette, &scene, origin, direction, 30_000, 7).mean();
        let b = average_radiance(&depth_capped, &scene, origin, direction, 30_000, 8).mean();

        let tolerance = 0.1 * b.max(0.01);
        assert!(
            (a - b).abs() < tolerance,
            "roulette estimate {a} deviates from reference {b}"
        );
    }

    #[test]
    fn dielectric_paths_stay_finite_and_non_negative() {
        let mut scene = light_and_plane(2.0);
        scene.push_object(Object::new(vec![Primitive::sphere(
            [0.0, 0.3, 0.0].into(),
            0.2,
            Material::glass(Color::repeat(0.95), 1.5),
        )]));

        let tracer = PathTracer {
            min_bounces: 2,
            max_bounces: 8,
        };
        let mut rng = SmallRng::seed_from_u64(5);

        // A fan of rays through the glass sphere, including grazing ones.
        for i in 0..200 {
            let x = -0.3 + 0.003 * i as f32;
            let radiance = tracer.radiance(
                &scene,
                [x, 0.6, 0.01].into(),
                WorldVector::new(0.0, -1.0, 0.0),
                1.0,
                0,
                &mut rng,
            );
            for c in radiance.iter() {
                assert!(c.is_finite());
                assert!(*c >= 0.0);
            }
        }
    }

    #[test]
    fn identical_seeds_give_identical_estimates() {
        let scene = light_and_plane(2.0);
        let tracer = PathTracer {
            min_bounces: 1,
            max_bounces: 8,
        };
        let origin = WorldPoint::new(0.2, 0.5, 0.1);
        let direction = WorldVector::new(0.1, -1.0, 0.0).normalize();

        let a = average_radiance(&tracer, &scene, origin, direction, 500, 42);
        let b = average_radiance(&tracer, &scene, origin, direction, 500, 42);
        assert!(a == b);
    }
}
