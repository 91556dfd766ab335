//! Spatial shape capability surface

use crate::foundation::math::Vec3;
use crate::spatial::Aabb;

/// Capability trait shared by all spatial-bound variants.
///
/// Consumers that only need containment or overlap tests (culling,
/// picking, broad-phase filters) take `&dyn AbstractShape` and stay
/// agnostic of the concrete bound.
pub trait AbstractShape {
    /// Check if the shape contains a point
    fn contains_point(&self, point: Vec3) -> bool;

    /// Check if the shape overlaps an axis-aligned box
    fn intersects_aabb(&self, aabb: &Aabb) -> bool;
}

impl AbstractShape for Aabb {
    fn contains_point(&self, point: Vec3) -> bool {
        Aabb::contains_point(self, point)
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects(aabb)
    }
}

/// A bounding sphere
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// The smallest sphere enclosing an axis-aligned box
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.extents().magnitude(),
        }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }
}

impl AbstractShape for BoundingSphere {
    fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        // Closest point on the box to the sphere center
        let closest = Vec3::new(
            aabb.min.x.max(self.center.x.min(aabb.max.x)),
            aabb.min.y.max(self.center.y.min(aabb.max.y)),
            aabb.min.z.max(self.center.z.min(aabb.max.z)),
        );
        (closest - self.center).magnitude_squared() <= self.radius * self.radius
    }
}
