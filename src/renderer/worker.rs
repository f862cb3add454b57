use image::RgbaImage;
use rand::{SeedableRng as _, rngs::SmallRng};

use crate::{
    camera::Camera,
    geometry::{ScreenBlock, ScreenPoint},
    renderer::RenderSettings,
    scene::Scene,
    screen_block::ScreenBlockExt as _,
    util::Rgba,
};

pub struct Worker;

impl Worker {
    /// Renders one tile into `buffer` (anchored at the tile's min corner).
    ///
    /// The random generator is seeded from the render seed and the tile
    /// index, so the result does not depend on which worker thread picks the
    /// tile up.
    pub fn render_tile(
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
        tile_index: usize,
        tile: &ScreenBlock,
        buffer: &mut RgbaImage,
    ) {
        let mut rng =
            SmallRng::seed_from_u64(settings.seed ^ (tile_index as u64).wrapping_mul(0x9E3779B97F4A7C15));

        for point in tile.internal_points() {
            let mut pixel_sum = Rgba::new(0.0, 0.0, 0.0, 0.0);
            for _ in 0..settings.sample_count.get() {
                pixel_sum += Self::render_sample(scene, camera, settings, &point, &mut rng);
            }
            let pixel = pixel_sum * (1.0 / settings.sample_count.get() as f32);

            let buffer_position = point - tile.min;
            buffer.put_pixel(buffer_position.x, buffer_position.y, color_to_image(pixel));
        }
    }

    fn render_sample(
        scene: &Scene,
        camera: &Camera,
        settings: &RenderSettings,
        point: &ScreenPoint,
        rng: &mut SmallRng,
    ) -> Rgba {
        let ray = camera.sample_ray(point, rng);
        let radiance = settings
            .tracer
            .radiance(scene, ray.origin, ray.direction, 1.0, 0, rng);
        Rgba::new(radiance.x, radiance.y, radiance.z, 1.0)
    }
}

/// Maps a 0-1 f32 rgba pixel to a pixel type compatible with module image.
pub fn color_to_image(color: Rgba) -> image::Rgba<u8> {
    image::Rgba([
        (color.r * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.g * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.b * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn color_conversion_clamps() {
        let pixel = color_to_image(Rgba::new(-0.5, 0.5, 7.0, 1.0));
        assert!(pixel.0 == [0, 128, 255, 255]);
    }
}
