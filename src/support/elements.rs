// Support element records: pinheads, pillars, junctions and bridges.
// Each element owns the triangle mesh fragment that renders it.

use crate::geometry::{Point3D, Vector3D};
use crate::mesh::TriangleMesh;
use crate::primitives::{cylinder, sphere};
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Ring resolution used by every element mesh
pub const DEFAULT_STEPS: usize = 45;

/// Rotation taking the canonical down axis onto `dir`, with the
/// anti-parallel case handled explicitly (nalgebra returns no rotation
/// for opposite vectors)
fn dir_quaternion(from: &Vector3D, dir: &Vector3D) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between(from, dir)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3D::x_axis(), PI))
}

/// Truncated cone from the back of a head down towards a pillar, owned by
/// the head record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tail {
    pub mesh: TriangleMesh,
    pub length: f64,
}

/// Pinhead: a large back sphere and a small front sphere joined by a
/// tangential cone, with the pinpoint at `translation` after `transform`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Head {
    pub mesh: TriangleMesh,
    pub tail: Tail,
    pub steps: usize,
    /// Unit direction the head points along (the anchor's corrected normal)
    pub direction: Vector3D,
    /// Position of the pinpoint, i.e. the anchor
    pub translation: Point3D,
    pub r_back: f64,
    pub r_front: f64,
    pub width: f64,
}

impl Head {
    pub fn new(
        r_back: f64,
        r_front: f64,
        width: f64,
        direction: Vector3D,
        offset: Point3D,
        steps: usize,
    ) -> Self {
        let detail = 2.0 * PI / steps as f64;

        // The portions of the two spheres not covered by the connecting
        // cone follow from the tangent construction: phi offsets both
        // half-sphere boundaries so the cone meets them smoothly.
        let h = r_back + r_front + width;
        let phi = PI / 2.0 - ((r_back - r_front) / h).acos();

        let mut mesh = sphere(r_back, (0.0, PI / 2.0 + phi), detail);
        let mut s2 = sphere(r_front, (PI / 2.0 + phi, PI), detail);
        for p in &mut s2.vertices {
            p.z += h;
        }

        let n1 = mesh.vertices.len() as i32;
        mesh.merge(&s2);

        // stitch the last ring of the back sphere to the first ring of the
        // front sphere
        let steps_i = steps as i32;
        for k in 0..steps_i - 1 {
            let i1s1 = n1 - steps_i + k;
            let i1s2 = n1 + k;
            mesh.triangles.push([i1s1, i1s1 + 1, i1s2 + 1]);
            mesh.triangles.push([i1s1, i1s2 + 1, i1s2]);
        }
        mesh.triangles.push([n1 + steps_i - 1, n1 - 1, n1 - steps_i]);
        mesh.triangles.push([n1, n1 + steps_i - 1, n1 - steps_i]);

        // place the pinpoint at the origin so transform() lands it on the
        // anchor
        for p in &mut mesh.vertices {
            p.z -= h + r_front;
        }

        Self {
            mesh,
            tail: Tail {
                mesh: TriangleMesh::new(),
                length: 0.8 * width,
            },
            steps,
            direction,
            translation: offset,
            r_back,
            r_front,
            width,
        }
    }

    /// Rotate the canonical head onto `direction` and move the pinpoint to
    /// `translation`. Must be applied exactly once, before any consumer
    /// reads the mesh.
    pub fn transform(&mut self) {
        let rotation = dir_quaternion(&Vector3D::new(0.0, 0.0, -1.0), &self.direction);
        self.mesh.transform(&rotation, self.translation.coords);
    }

    /// Total element length along `direction`
    pub fn full_width(&self) -> f64 {
        2.0 * self.r_front + self.width + 2.0 * self.r_back
    }

    /// Center of the back sphere, where pillars and bridges connect
    pub fn junction_point(&self) -> Point3D {
        self.translation + (2.0 * self.r_front + self.width + self.r_back) * self.direction
    }

    /// Clip a requested pillar radius so a pillar is never thicker than
    /// the head it hangs from
    pub fn request_pillar_radius(&self, radius: f64) -> f64 {
        if radius > 0.0 && radius < self.r_back {
            radius
        } else {
            self.r_back * 0.65
        }
    }

    /// Append the tail frustum: from a ring of 0.9 * r_back at the back of
    /// the head down to a pillar-radius ring one tail-length below. `None`
    /// keeps the default length / the default clipped radius.
    pub fn add_tail(&mut self, length: Option<f64>, radius: Option<f64>) {
        if let Some(l) = length {
            self.tail.length = l;
        }

        let c = self.junction_point();
        let r_top = self.r_back * 0.9;
        let r_low = self.request_pillar_radius(radius.unwrap_or(0.0));

        let a = 2.0 * PI / self.steps as f64;
        let mesh = &mut self.tail.mesh;
        mesh.vertices.reserve(2 * self.steps);

        for i in 0..self.steps {
            let phi = i as f64 * a;
            mesh.vertices.push(Point3D::new(
                c.x + r_top * phi.cos(),
                c.y + r_top * phi.sin(),
                c.z,
            ));
        }
        for i in 0..self.steps {
            let phi = i as f64 * a;
            mesh.vertices.push(Point3D::new(
                c.x + r_low * phi.cos(),
                c.y + r_low * phi.sin(),
                c.z - self.tail.length,
            ));
        }

        let steps = self.steps as i32;
        for i in 0..steps - 1 {
            mesh.triangles.push([i, i + steps, steps + i + 1]);
            mesh.triangles.push([i, steps + i + 1, i + 1]);
        }
        let last = steps - 1;
        mesh.triangles.push([0, last, steps]);
        mesh.triangles.push([last, steps + last, steps]);
    }
}

/// Vertical truncated cylinder from the tail of a head down to `endpoint`.
/// Never tilted; only the endpoint height varies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub mesh: TriangleMesh,
    /// Flared pad on the build plate, or the mesh of an auxiliary cap head
    /// for pillars standing on the model. Empty when absent.
    pub base: TriangleMesh,
    pub r: f64,
    pub steps: usize,
    pub endpoint: Point3D,
    /// Index of the originating head in the tree's head collection
    pub head_id: usize,
}

impl Pillar {
    /// Build the pillar tube by dropping the head's lower tail ring to the
    /// endpoint height. The head must already carry a tail.
    pub(crate) fn from_head(head: &Head, head_id: usize, endpoint: Point3D, radius: f64) -> Self {
        let steps = head.steps;
        debug_assert!(
            head.tail.mesh.vertices.len() >= 2 * steps,
            "pillar requires a tailed head"
        );

        let r = head.request_pillar_radius(radius);

        let mut mesh = TriangleMesh::new();
        let ring = &head.tail.mesh.vertices[steps..2 * steps];
        mesh.vertices.extend_from_slice(ring);
        for p in ring {
            mesh.vertices.push(Point3D::new(p.x, p.y, endpoint.z));
        }

        let steps_i = steps as i32;
        for i in 0..steps_i - 1 {
            mesh.triangles.push([i, i + steps_i, steps_i + i + 1]);
            mesh.triangles.push([i, steps_i + i + 1, i + 1]);
        }
        let last = steps_i - 1;
        mesh.triangles.push([0, last, steps_i]);
        mesh.triangles.push([last, steps_i + last, steps_i]);

        Self {
            mesh,
            base: TriangleMesh::new(),
            r,
            steps,
            endpoint,
            head_id,
        }
    }

    /// Attach a flared pad: a cone from pillar radius at `height` above the
    /// endpoint out to `radius` on the plate, capped top and bottom
    pub fn add_base(&mut self, height: f64, radius: f64) {
        if height <= 0.0 {
            return;
        }

        let radius = radius.max(self.r);

        let a = 2.0 * PI / self.steps as f64;
        let z = self.endpoint.z + height;

        for i in 0..self.steps {
            let phi = i as f64 * a;
            self.base.vertices.push(Point3D::new(
                self.endpoint.x + self.r * phi.cos(),
                self.endpoint.y + self.r * phi.sin(),
                z,
            ));
        }
        for i in 0..self.steps {
            let phi = i as f64 * a;
            self.base.vertices.push(Point3D::new(
                self.endpoint.x + radius * phi.cos(),
                self.endpoint.y + radius * phi.sin(),
                z - height,
            ));
        }

        let mut raised = self.endpoint;
        raised.z += height;
        self.base.vertices.push(self.endpoint);
        self.base.vertices.push(raised);

        let hcenter = self.base.vertices.len() as i32 - 1;
        let lcenter = hcenter - 1;
        let offs = self.steps as i32;

        for i in 0..offs - 1 {
            self.base.triangles.push([i, i + offs, offs + i + 1]);
            self.base.triangles.push([i, offs + i + 1, i + 1]);
            self.base.triangles.push([i, i + 1, hcenter]);
            self.base.triangles.push([lcenter, offs + i + 1, offs + i]);
        }
        let last = offs - 1;
        self.base.triangles.push([0, last, offs]);
        self.base.triangles.push([last, offs + last, offs]);
        self.base.triangles.push([hcenter, last, 0]);
        self.base.triangles.push([offs, offs + last, lcenter]);
    }

    pub fn has_base(&self) -> bool {
        !self.base.vertices.is_empty()
    }
}

/// Hemispherical fillet marking a bridge connection on a pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub mesh: TriangleMesh,
    pub r: f64,
    pub steps: usize,
    pub pos: Point3D,
}

impl Junction {
    pub fn new(pos: Point3D, r: f64, steps: usize) -> Self {
        let mut mesh = sphere(r, (0.0, PI / 2.0), 2.0 * PI / steps as f64);
        mesh.translate(pos.coords);
        Self {
            mesh,
            r,
            steps,
            pos,
        }
    }
}

/// Slanted cylinder connecting two junctions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub mesh: TriangleMesh,
    pub r: f64,
}

impl Bridge {
    pub fn new(j1: &Junction, j2: &Junction, r: f64) -> Self {
        Self::between(j1.pos, j2.pos, r)
    }

    /// Cylinder between two points, rotated from the canonical +Z axis
    pub fn between(from: Point3D, to: Point3D, r: f64) -> Self {
        let delta = to - from;
        let d = delta.norm();

        let mut mesh = cylinder(r, d, 2.0 * PI / DEFAULT_STEPS as f64);
        let rotation = dir_quaternion(&Vector3D::z(), &delta);
        mesh.transform(&rotation, from.coords);

        Self { mesh, r }
    }
}
