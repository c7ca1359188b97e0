// Triangulated primitive builders for the support elements

use crate::geometry::Point3D;
use crate::mesh::TriangleMesh;
use nalgebra::{Rotation2, Vector2};
use std::f64::consts::PI;

/// Polar range of a sphere portion in radians. `(0, PI)` walks the stacked
/// rings from the south pole all the way to the north pole; a smaller upper
/// bound leaves the top open so another surface can be stitched on.
pub type Portion = (f64, f64);

/// Portion of a sphere of radius `rho`, built as a stack of latitude rings
/// with evenly spaced heights. `fa` is the desired angular step; the actual
/// step is rounded so that a ring always closes with a whole number of
/// segments. Radii below 1e-6 produce an empty mesh.
pub fn sphere(rho: f64, portion: Portion, fa: f64) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();

    if rho.abs() < 1e-6 {
        return mesh;
    }

    // round so the requested angle divides the full turn evenly
    let steps = (2.0 * PI / fa).floor() as usize;
    let angle = 2.0 * PI / steps as f64;
    let increment = 1.0 / steps as f64;

    let sbegin = (2.0 * portion.0 / angle) as usize;
    // rounding guard so a portion ending at the pole actually reaches it
    let send = (2.0 * portion.1 / angle + 1e-9) as usize;

    let steps_i = steps as i32;

    // first ring connects to a south pole vertex
    if sbegin == 0 {
        mesh.vertices.push(Point3D::new(0.0, 0.0, -rho));
    }

    let mut id = mesh.vertices.len() as i32;
    let z = -rho + increment * 2.0 * rho * (sbegin as f64 + 1.0);
    let r = (rho * rho - z * z).abs().sqrt();
    for i in 0..steps {
        let b = Rotation2::new(i as f64 * angle) * Vector2::new(0.0, r);
        mesh.vertices.push(Point3D::new(b.x, b.y, z));

        if sbegin == 0 {
            if i == 0 {
                mesh.triangles.push([steps_i, 0, 1]);
            } else {
                mesh.triangles.push([id - 1, 0, id]);
            }
        }
        id += 1;
    }

    // intermediate rings, each joined to the ring below it with quads
    for s in (sbegin + 2)..send.saturating_sub(1) {
        let z = -rho + increment * s as f64 * 2.0 * rho;
        let r = (rho * rho - z * z).abs().sqrt();

        for i in 0..steps {
            let b = Rotation2::new(i as f64 * angle) * Vector2::new(0.0, r);
            mesh.vertices.push(Point3D::new(b.x, b.y, z));

            let id_ringsize = id - steps_i;
            if i == 0 {
                // wrap around
                mesh.triangles.push([id - 1, id, id + steps_i - 1]);
                mesh.triangles.push([id - 1, id_ringsize, id]);
            } else {
                mesh.triangles.push([id_ringsize - 1, id_ringsize, id]);
                mesh.triangles.push([id - 1, id_ringsize - 1, id]);
            }
            id += 1;
        }
    }

    // last ring fans to a north pole vertex when the portion reaches it
    if send >= steps {
        mesh.vertices
            .push(Point3D::new(0.0, 0.0, -rho + increment * send as f64 * 2.0 * rho));
        for i in 0..steps_i {
            let id_ringsize = id - steps_i;
            if i == 0 {
                mesh.triangles.push([id - 1, id_ringsize, id]);
            } else {
                let ci = id_ringsize + i;
                mesh.triangles.push([ci - 1, ci, id]);
            }
        }
    }

    mesh
}

/// Cylinder of radius `r` along +Z from z=0 to z=`h`, with fan caps around
/// two center vertices. Same angular rounding as `sphere`.
pub fn cylinder(r: f64, h: f64, fa: f64) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();

    let steps = (2.0 * PI / fa).floor() as usize;
    let angle = 2.0 * PI / steps as f64;

    // cap centers; ring vertices are laid out in bottom/top pairs after them
    mesh.vertices.push(Point3D::new(0.0, 0.0, 0.0));
    mesh.vertices.push(Point3D::new(0.0, 0.0, h));

    for i in 0..steps {
        let p = Rotation2::new(i as f64 * angle) * Vector2::new(0.0, r);
        mesh.vertices.push(Point3D::new(p.x, p.y, 0.0));
        mesh.vertices.push(Point3D::new(p.x, p.y, h));
    }

    let bot = |i: usize| 2 + 2 * (i % steps) as i32;
    let top = |i: usize| 3 + 2 * (i % steps) as i32;
    for i in 0..steps {
        mesh.triangles.push([0, bot(i + 1), bot(i)]);
        mesh.triangles.push([top(i + 1), 1, top(i)]);
        mesh.triangles.push([top(i + 1), top(i), bot(i)]);
        mesh.triangles.push([top(i + 1), bot(i), bot(i + 1)]);
    }

    mesh
}
