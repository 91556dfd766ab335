//! Axis-Aligned Bounding Box

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// The degenerate zero box: a single point at the origin.
    ///
    /// Used as the well-defined bound of a node with no geometry.
    pub fn zero() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }

    /// Tightest box containing every point of the given set; the zero box
    /// when the set is empty.
    pub fn from_points(points: &[Point3]) -> Self {
        let mut points_iter = points.iter();
        let Some(first) = points_iter.next() else {
            return Self::zero();
        };

        let mut bounds = Self::new(first.coords, first.coords);
        for point in points_iter {
            bounds = bounds.expanded_to_contain(point.coords);
        }
        bounds
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Smallest box containing both this box and the given point
    pub fn expanded_to_contain(&self, point: Vec3) -> Self {
        Self {
            min: Vec3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Vec3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Point3; 8] {
        [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Axis-aligned refit of this box under an affine transform.
    ///
    /// Transforms all eight corners and takes the component-wise min/max,
    /// so the result bounds the transformed box under rotation and shear
    /// as well as translation and scale.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let mut corners = self.corners().into_iter();
        // corners() always yields eight points
        let first = matrix.transform_point(&corners.next().unwrap_or(Point3::origin()));

        let mut bounds = Self::new(first.coords, first.coords);
        for corner in corners {
            let transformed = matrix.transform_point(&corner);
            bounds = bounds.expanded_to_contain(transformed.coords);
        }
        bounds
    }
}
