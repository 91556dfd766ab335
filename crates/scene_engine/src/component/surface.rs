//! Surface component: the geometry a node presents to spatial queries
//!
//! Only the geometry capability of a full render surface is kept here;
//! materials and effects belong to the rendering layer. Geometry is
//! immutable once created; swapping a node's geometry is a
//! remove/re-add of its Surface, which keeps change notification on the
//! component signals.

use std::any::Any;
use std::rc::Rc;

use crate::component::{Component, Targets};
use crate::foundation::math::Point3;
use crate::scene::NodeRef;
use crate::spatial::Aabb;

/// Immutable vertex-position set
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<Point3>,
}

impl Geometry {
    /// Create a geometry from explicit vertex positions
    pub fn new(positions: Vec<Point3>) -> Rc<Self> {
        Rc::new(Self { positions })
    }

    /// A unit cube centered at the origin
    pub fn cube() -> Rc<Self> {
        let h = 0.5;
        Self::new(vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(-h, h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(-h, h, h),
            Point3::new(h, h, h),
        ])
    }

    /// The vertex positions
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    /// Tightest local-space bound of the positions; the zero box when the
    /// geometry is empty
    pub fn compute_bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

/// Component carrying a node's geometry
pub struct Surface {
    geometry: Rc<Geometry>,
    targets: Targets,
}

impl Surface {
    /// Create a surface over the given geometry
    pub fn create(geometry: Rc<Geometry>) -> Rc<Self> {
        Rc::new(Self {
            geometry,
            targets: Targets::new(),
        })
    }

    /// The surface's geometry
    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }
}

impl Component for Surface {
    fn target_added(self: Rc<Self>, node: &NodeRef) {
        assert!(
            self.targets.is_empty(),
            "Surface cannot have more than one target."
        );
        self.targets.add(node);
    }

    fn target_removed(self: Rc<Self>, node: &NodeRef) {
        self.targets.remove(node);
    }

    fn targets(&self) -> Vec<NodeRef> {
        self.targets.all()
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_cube_bounds() {
        let bounds = Geometry::cube().compute_bounds();
        assert_eq!(bounds.min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(bounds.max, Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_empty_geometry_bounds_are_zero() {
        let geometry = Geometry::new(Vec::new());
        assert_eq!(geometry.compute_bounds(), Aabb::zero());
    }
}
