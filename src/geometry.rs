use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// 3D point type
pub type Point3D = Point3<f64>;

/// 3D vector type
pub type Vector3D = Vector3<f64>;

/// 2D point type (XY projections)
pub type Point2D = Point2<f64>;

/// Triangle defined by three vertices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub v0: Point3D,
    pub v1: Point3D,
    pub v2: Point3D,
}

impl Triangle {
    pub fn new(v0: Point3D, v1: Point3D, v2: Point3D) -> Self {
        Self { v0, v1, v2 }
    }

    /// Calculate the normal vector of the triangle
    /// Returns a unit normal, or (0, 0, 1) for degenerate triangles
    pub fn normal(&self) -> Vector3D {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let cross = edge1.cross(&edge2);
        let norm = cross.norm();

        // Handle degenerate triangles (zero area or nearly colinear)
        if norm < 1e-10 || !norm.is_finite() {
            return Vector3D::new(0.0, 0.0, 1.0);
        }

        cross / norm
    }
}

/// Project a point onto the XY plane
pub fn to_xy(p: &Point3D) -> Point2D {
    Point2D::new(p.x, p.y)
}

/// Distance between two points in the XY plane, ignoring Z
pub fn xy_distance(a: &Point3D, b: &Point3D) -> f64 {
    (to_xy(b) - to_xy(a)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_normal() {
        let tri = Triangle::new(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
        );

        let n = tri.normal();
        assert!((n - Vector3D::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_normal() {
        let tri = Triangle::new(
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(2.0, 0.0, 0.0),
        );

        // colinear vertices fall back to the safe default
        assert_eq!(tri.normal(), Vector3D::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_xy_distance_ignores_z() {
        let a = Point3D::new(0.0, 0.0, 5.0);
        let b = Point3D::new(3.0, 4.0, -2.0);

        assert!((xy_distance(&a, &b) - 5.0).abs() < 1e-12);
    }
}
