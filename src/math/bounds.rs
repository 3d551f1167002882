use super::intersect_3d::ray_hits_sphere;
use super::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for an empty set.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along x, y and z.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }
}

/// A sphere enclosing a set of points, used to reject rays early.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3,
    pub radius: f64,
}

impl BoundingSphere {
    /// Sphere centred on the points' bounding box, just large enough to hold all of them.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3> + Clone) -> Option<Self> {
        let center = Aabb::from_points(points.clone())?.center();
        let radius = points
            .into_iter()
            .map(|p| (p - center).norm())
            .fold(0.0, f64::max);
        Some(Self { center, radius })
    }

    /// Returns `true` if the ray `origin + t * dir` (`t ≥ 0`) touches the sphere.
    #[must_use]
    pub fn intersects_ray(&self, origin: &Point3, dir: &Vector3) -> bool {
        ray_hits_sphere(origin, dir, &self.center, self.radius)
    }

    #[must_use]
    pub fn contains(&self, p: &Point3) -> bool {
        (p - self.center).norm() <= self.radius
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn aabb_of_points() {
        let pts = [p(1.0, -2.0, 3.0), p(-1.0, 4.0, 0.0), p(0.0, 0.0, 5.0)];
        let aabb = Aabb::from_points(&pts).unwrap();
        assert_eq!(aabb.min, p(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, p(1.0, 4.0, 5.0));
        assert!((aabb.extents() - Vector3::new(2.0, 6.0, 5.0)).norm() < TOLERANCE);
    }

    #[test]
    fn empty_set_has_no_bounds() {
        let pts: [Point3; 0] = [];
        assert!(Aabb::from_points(&pts).is_none());
        assert!(BoundingSphere::from_points(&pts).is_none());
    }

    #[test]
    fn sphere_contains_all_points() {
        let pts = [
            p(1.0, 0.0, 0.0),
            p(-1.0, 0.0, 0.0),
            p(0.0, 3.0, 0.0),
            p(0.0, 0.0, -2.0),
        ];
        let sphere = BoundingSphere::from_points(&pts).unwrap();
        for q in &pts {
            assert!(sphere.contains(q));
        }
    }

    #[test]
    fn single_point_sphere_has_zero_radius() {
        let pts = [p(2.0, 2.0, 2.0)];
        let sphere = BoundingSphere::from_points(&pts).unwrap();
        assert!(sphere.radius.abs() < TOLERANCE);
        assert!(sphere.intersects_ray(&p(2.0, 2.0, 0.0), &Vector3::z()));
    }
}
