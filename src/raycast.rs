// Ray and point queries against the object mesh

use crate::geometry::{Point3D, Triangle, Vector3D};
use crate::mesh::TriangleMesh;
use parry3d_f64::query::{PointQuery, Ray, RayCast};
use parry3d_f64::shape::Triangle as ParryTriangle;
use rayon::prelude::*;

fn triangle_bounds(tri: &Triangle) -> (Point3D, Point3D) {
    let lo = Point3D::new(
        tri.v0.x.min(tri.v1.x).min(tri.v2.x),
        tri.v0.y.min(tri.v1.y).min(tri.v2.y),
        tri.v0.z.min(tri.v1.z).min(tri.v2.z),
    );
    let hi = Point3D::new(
        tri.v0.x.max(tri.v1.x).max(tri.v2.x),
        tri.v0.y.max(tri.v1.y).max(tri.v2.y),
        tri.v0.z.max(tri.v1.z).max(tri.v2.z),
    );
    (lo, hi)
}

/// Slab test: does the forward ray touch the box [lo, hi]?
fn ray_hits_aabb(origin: &Point3D, dir: &Vector3D, lo: &Point3D, hi: &Point3D) -> bool {
    let mut t_near = 0.0_f64;
    let mut t_far = f64::INFINITY;

    for axis in 0..3 {
        if dir[axis].abs() < 1e-12 {
            // parallel to this slab; must already be inside it
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return false;
            }
        } else {
            let t1 = (lo[axis] - origin[axis]) / dir[axis];
            let t2 = (hi[axis] - origin[axis]) / dir[axis];
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_near > t_far {
                return false;
            }
        }
    }
    true
}

/// Distance along `dir` (unit length) from `origin` to the nearest triangle
/// of `mesh`, or `f64::INFINITY` when the ray misses the mesh entirely.
pub fn ray_mesh_intersect(origin: &Point3D, dir: &Vector3D, mesh: &TriangleMesh) -> f64 {
    let ray = Ray::new(*origin, *dir);

    let mut nearest = f64::INFINITY;
    for tri in mesh.iter_triangles() {
        // fast AABB rejection per triangle
        let (lo, hi) = triangle_bounds(&tri);
        if !ray_hits_aabb(origin, dir, &lo, &hi) {
            continue;
        }

        let shape = ParryTriangle::new(tri.v0, tri.v1, tri.v2);
        if let Some(toi) = shape.cast_local_ray(&ray, f64::MAX, true) {
            if toi < nearest {
                nearest = toi;
            }
        }
    }
    nearest
}

/// Outward unit normal of the triangle owning each input point. The points
/// are assumed to lie on the mesh surface; each one is matched to its
/// closest triangle.
pub fn normals(points: &[Point3D], mesh: &TriangleMesh) -> Vec<Vector3D> {
    points
        .par_iter()
        .map(|p| owning_triangle_normal(p, mesh))
        .collect()
}

fn owning_triangle_normal(point: &Point3D, mesh: &TriangleMesh) -> Vector3D {
    let mut best_dist = f64::INFINITY;
    let mut normal = Vector3D::new(0.0, 0.0, 1.0);

    for tri in mesh.iter_triangles() {
        // a triangle can't beat the current best if its bounding box is
        // already further away
        let (lo, hi) = triangle_bounds(&tri);
        let mut box_d2 = 0.0;
        for axis in 0..3 {
            let c = point[axis].clamp(lo[axis], hi[axis]);
            box_d2 += (point[axis] - c) * (point[axis] - c);
        }
        if box_d2.sqrt() >= best_dist {
            continue;
        }

        let shape = ParryTriangle::new(tri.v0, tri.v1, tri.v2);
        let proj = shape.project_local_point(point, true);
        let dist = (proj.point - *point).norm();
        if dist < best_dist {
            best_dist = dist;
            normal = tri.normal();
        }
    }

    normal
}
