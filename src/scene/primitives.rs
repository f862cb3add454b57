use nalgebra::Matrix3;
use rand::Rng;
use rand_distr::{Distribution as _, UnitSphere};

use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};

use super::Material;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: WorldPoint,
    pub normal: WorldVector,
}

impl Vertex {
    pub fn new(position: WorldPoint) -> Vertex {
        Vertex {
            position,
            normal: WorldVector::zeros(),
        }
    }

    pub fn with_normal(position: WorldPoint, normal: WorldVector) -> Vertex {
        Vertex { position, normal }
    }
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub v0: Vertex,
    pub v1: Vertex,
    pub v2: Vertex,
    /// Edge vectors from v0, kept in sync with the vertices.
    pub e1: WorldVector,
    pub e2: WorldVector,
    normal: WorldVector,
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Triangle {
        let mut triangle = Triangle {
            v0,
            v1,
            v2,
            e1: WorldVector::zeros(),
            e2: WorldVector::zeros(),
            normal: WorldVector::zeros(),
        };
        triangle.compute_normal();
        triangle
    }

    pub fn from_points(v0: WorldPoint, v1: WorldPoint, v2: WorldPoint) -> Triangle {
        Triangle::new(Vertex::new(v0), Vertex::new(v1), Vertex::new(v2))
    }

    /// Recomputes the cached edge vectors and face normal from the vertices.
    fn compute_normal(&mut self) {
        self.e1 = self.v1.position - self.v0.position;
        self.e2 = self.v2.position - self.v0.position;
        self.normal = self.e2.cross(&self.e1).normalize();
    }

    pub fn normal(&self) -> WorldVector {
        self.normal
    }

    /// Ray parameter of the intersection, solving
    /// `origin + t * dir = v0 + u * e1 + v * e2` by Cramer's rule.
    pub fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        let b = ray.origin - self.v0.position;
        let det_a = Matrix3::from_columns(&[-ray.direction, self.e1, self.e2]).determinant();

        let dist = Matrix3::from_columns(&[b, self.e1, self.e2]).determinant() / det_a;
        // A near-parallel ray makes det_a vanish and the quotients non-finite;
        // NaN comparisons below all fail, which reports a miss.
        if !(dist.is_finite() && dist > 0.0) {
            return None;
        }

        let u = Matrix3::from_columns(&[-ray.direction, b, self.e2]).determinant() / det_a;
        let v = Matrix3::from_columns(&[-ray.direction, self.e1, b]).determinant() / det_a;
        if u >= 0.0 && v >= 0.0 && u + v <= 1.0 {
            Some(dist)
        } else {
            None
        }
    }

    /// Uniform point on the triangle by barycentric rejection sampling.
    pub fn random_point(&self, rng: &mut impl Rng) -> WorldPoint {
        loop {
            let u: FloatType = rng.random();
            let v: FloatType = rng.random();
            if u + v <= 1.0 {
                return self.v0.position + u * self.e1 + v * self.e2;
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Sphere {
        Sphere { center, radius }
    }

    /// Smallest strictly positive root of the ray/sphere quadratic.
    pub fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = -b - sqrt_disc;
        let t2 = -b + sqrt_disc;
        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }

    /// Only meaningful for points on the sphere's surface.
    pub fn normal_at(&self, p: &WorldPoint) -> WorldVector {
        (p - self.center) / self.radius
    }

    pub fn random_point(&self, rng: &mut impl Rng) -> WorldPoint {
        let dir: [FloatType; 3] = UnitSphere.sample(rng);
        self.center + self.radius * WorldVector::from(dir)
    }
}

#[derive(Clone, Debug)]
pub enum Shape {
    Triangle(Triangle),
    Sphere(Sphere),
}

/// A geometric surface bundled with its material.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub shape: Shape,
    pub material: Material,
}

impl Primitive {
    pub fn triangle(v0: WorldPoint, v1: WorldPoint, v2: WorldPoint, material: Material) -> Self {
        Primitive {
            shape: Shape::Triangle(Triangle::from_points(v0, v1, v2)),
            material,
        }
    }

    pub fn sphere(center: WorldPoint, radius: FloatType, material: Material) -> Self {
        Primitive {
            shape: Shape::Sphere(Sphere::new(center, radius)),
            material,
        }
    }

    /// Distance along the ray to the nearest intersection, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<FloatType> {
        match &self.shape {
            Shape::Triangle(triangle) => triangle.intersect(ray),
            Shape::Sphere(sphere) => sphere.intersect(ray),
        }
    }

    pub fn normal_at(&self, p: &WorldPoint) -> WorldVector {
        match &self.shape {
            Shape::Triangle(triangle) => triangle.normal(),
            Shape::Sphere(sphere) => sphere.normal_at(p),
        }
    }

    /// Uniform random point on the surface; used for sampling area lights.
    pub fn random_point(&self, rng: &mut impl Rng) -> WorldPoint {
        match &self.shape {
            Shape::Triangle(triangle) => triangle.random_point(rng),
            Shape::Sphere(sphere) => sphere.random_point(rng),
        }
    }

    pub fn is_light(&self) -> bool {
        self.material.is_emissive()
    }
}
