use std::{fs, path::Path};

use indexmap::IndexMap;
use thiserror::Error;

use crate::geometry::{WorldPoint, WorldVector};

use super::{Material, Object, Primitive, Shape, Triangle, Vertex};

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    Parse(#[from] wavefront_obj::ParseError),
}

impl Object {
    /// Loads every triangle of a Wavefront OBJ file into one object, all
    /// sharing `material`. Texture and per-face material information in the
    /// file is ignored.
    pub fn from_obj(path: impl AsRef<Path>, material: Material) -> Result<Object, MeshError> {
        let content = fs::read_to_string(path)?;
        let parsed = wavefront_obj::obj::parse(content)?;
        Ok(Self::load_obj(parsed, material))
    }

    fn load_obj(obj: wavefront_obj::obj::ObjSet, material: Material) -> Object {
        let mut primitives = Vec::new();

        for o in obj.objects.into_iter() {
            // Dedup on the (position, normal) index pair so shared corners
            // are converted only once.
            let mut vertices = IndexMap::new();
            let mut triangles = Vec::new();

            for geometry in o.geometry {
                for shape in geometry.shapes {
                    let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                        log::warn!("skipping non-triangle primitive in {}", o.name);
                        continue;
                    };

                    let mut handle_vertex = |vtindex: (usize, Option<usize>, Option<usize>)| {
                        let entry = vertices.entry((vtindex.0, vtindex.2));
                        let index = entry.index();
                        entry.or_insert_with(|| {
                            let vertex = &o.vertices[vtindex.0];
                            let normal = vtindex.2.map(|i| &o.normals[i]);
                            Vertex::with_normal(
                                WorldPoint::new(
                                    vertex.x as f32,
                                    vertex.y as f32,
                                    vertex.z as f32,
                                ),
                                normal.map_or_else(WorldVector::zeros, |n| {
                                    WorldVector::new(n.x as f32, n.y as f32, n.z as f32)
                                        .normalize()
                                }),
                            )
                        });
                        index
                    };

                    let a = handle_vertex(a);
                    let b = handle_vertex(b);
                    let c = handle_vertex(c);

                    triangles.push((a, b, c));
                }
            }

            let vertices: Vec<Vertex> = vertices.into_iter().map(|(_k, v)| v).collect();
            primitives.extend(triangles.into_iter().map(|(a, b, c)| Primitive {
                shape: Shape::Triangle(Triangle::new(vertices[a], vertices[b], vertices[c])),
                material: material.clone(),
            }));
        }

        Object::new(primitives)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    const CUBE_OBJ: &str = "\
o cube
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3
f 1 3 4
";

    #[test]
    fn parses_triangles_with_shared_vertices() {
        let parsed = wavefront_obj::obj::parse(CUBE_OBJ.to_string()).expect("valid obj");
        let object = Object::load_obj(parsed, Material::default());

        assert!(object.primitives.len() == 2);
        for primitive in &object.primitives {
            assert!(matches!(primitive.shape, Shape::Triangle(_)));
        }
    }

    #[test]
    fn missing_file_reports_read_error() {
        let result = Object::from_obj("/nonexistent/model.obj", Material::default());
        assert!(matches!(result, Err(MeshError::Read(_))));
    }
}
