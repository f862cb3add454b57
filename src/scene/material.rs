use crate::geometry::FloatType;

/// Linear RGB color / radiance value.
pub type Color = nalgebra::Vector3<FloatType>;

/// Surface description attached to every primitive.
///
/// The ambient/diffuse/specular/transmittance channels are per-channel
/// weights applied to the corresponding lighting terms; a non-zero emission
/// makes the surface a light source.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub transmittance: Color,
    pub emission: Color,
    /// Phong exponent for the glossy lobe.
    pub shininess: FloatType,
    pub refractive_index: FloatType,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            color: Color::zeros(),
            ambient: Color::zeros(),
            diffuse: Color::zeros(),
            specular: Color::zeros(),
            transmittance: Color::zeros(),
            emission: Color::zeros(),
            shininess: 1.0,
            refractive_index: 1.0,
        }
    }
}

impl Material {
    /// Non-emissive surface with uniform ambient/specular/diffuse weights.
    pub fn opaque(
        color: Color,
        shininess: FloatType,
        ambient: FloatType,
        specular: FloatType,
        diffuse: FloatType,
    ) -> Material {
        Material {
            color,
            ambient: Color::repeat(ambient),
            diffuse: Color::repeat(diffuse),
            specular: Color::repeat(specular),
            shininess,
            ..Material::default()
        }
    }

    /// Area-light surface.
    pub fn emissive(emission: Color) -> Material {
        Material {
            emission,
            ambient: Color::repeat(0.1),
            specular: Color::repeat(0.1),
            diffuse: Color::repeat(0.8),
            ..Material::default()
        }
    }

    /// Transmissive dielectric.
    pub fn glass(color: Color, refractive_index: FloatType) -> Material {
        Material {
            color,
            ambient: Color::repeat(1.0),
            transmittance: Color::repeat(1.0),
            refractive_index,
            ..Material::default()
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.iter().any(|&channel| channel > 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn emission_in_any_channel_makes_a_light() {
        assert!(!Material::default().is_emissive());
        assert!(Material::emissive(Color::new(0.0, 0.0, 0.1)).is_emissive());
        assert!(!Material::opaque(Color::repeat(0.75), 10.0, 0.5, 0.06, 0.44).is_emissive());
    }
}
