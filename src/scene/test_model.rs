use crate::geometry::WorldPoint;

use super::{Color, Material, Object, Primitive, Scene};

/// Length of the Cornell box side before scaling.
const L: f32 = 555.0;

/// Maps the classic Cornell box coordinates into [-1, 1]^3, mirroring the
/// x and y axes so that the camera at negative z sees the red wall on the
/// left and the light at the top.
fn transform(p: [f32; 3]) -> WorldPoint {
    WorldPoint::new(
        -(p[0] * 2.0 / L - 1.0),
        -(p[1] * 2.0 / L - 1.0),
        p[2] * 2.0 / L - 1.0,
    )
}

fn tri(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3], material: Material) -> Primitive {
    Primitive::triangle(transform(v0), transform(v1), transform(v2), material)
}

/// The test scene: a Cornell box filling [-1, 1]^3 with two matte spheres
/// and a square area light just below the ceiling.
pub fn cornell_box() -> Scene {
    let red = Color::new(0.75, 0.15, 0.15);
    let green = Color::new(0.15, 0.75, 0.15);
    let white = Color::repeat(0.75);

    let mut scene = Scene::new();

    scene.push_object(Object::new(vec![Primitive::sphere(
        [-0.45, 0.6, 0.4].into(),
        0.4,
        Material::opaque(white, 2.0, 0.5, 0.04, 0.46),
    )]));
    scene.push_object(Object::new(vec![Primitive::sphere(
        [0.6, 0.6, -0.4].into(),
        0.3,
        Material::opaque(white, 2.0, 0.5, 0.04, 0.46),
    )]));

    // Square area light just below the ceiling.
    let light = Material::emissive(Color::repeat(50.0));
    scene.push_object(Object::new(vec![
        tri(
            [3.0 * L / 5.0, 0.99 * L, 2.0 * L / 5.0],
            [2.0 * L / 5.0, 0.99 * L, 2.0 * L / 5.0],
            [3.0 * L / 5.0, 0.99 * L, 3.0 * L / 5.0],
            light.clone(),
        ),
        tri(
            [2.0 * L / 5.0, 0.99 * L, 2.0 * L / 5.0],
            [2.0 * L / 5.0, 0.99 * L, 3.0 * L / 5.0],
            [3.0 * L / 5.0, 0.99 * L, 3.0 * L / 5.0],
            light,
        ),
    ]));

    let a = [L, 0.0, 0.0];
    let b = [0.0, 0.0, 0.0];
    let c = [L, 0.0, L];
    let d = [0.0, 0.0, L];
    let e = [L, L, 0.0];
    let f = [0.0, L, 0.0];
    let g = [L, L, L];
    let h = [0.0, L, L];

    let floor = Material::opaque(white, 10.0, 0.5, 0.06, 0.44);
    scene.push_object(Object::new(vec![
        tri(c, b, a, floor.clone()),
        tri(c, d, b, floor),
    ]));

    let left = Material::opaque(red, 2.0, 0.5, 0.04, 0.46);
    scene.push_object(Object::new(vec![
        tri(a, e, c, left.clone()),
        tri(c, e, g, left),
    ]));

    let right = Material::opaque(green, 2.0, 0.5, 0.04, 0.46);
    scene.push_object(Object::new(vec![
        tri(f, b, d, right.clone()),
        tri(h, f, d, right),
    ]));

    let ceiling = Material::opaque(white, 10.0, 0.5, 0.46, 0.04);
    scene.push_object(Object::new(vec![
        tri(e, f, g, ceiling.clone()),
        tri(f, h, g, ceiling),
    ]));

    let back = Material::opaque(white, 10.0, 0.5, 0.06, 0.44);
    scene.push_object(Object::new(vec![
        tri(g, d, c, back.clone()),
        tri(g, h, d, back),
    ]));

    scene
}
