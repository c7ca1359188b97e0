use crate::geometry::{Point3D, Triangle, Vector3D};
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Failed to load mesh: {0}")]
    LoadError(String),

    #[error("Empty mesh")]
    EmptyMesh,
}

/// Indexed triangle mesh: an ordered vertex list plus triangles as triples
/// of indices into that list. Used both for the object being supported and
/// for the mesh fragments of the generated support elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3D>,
    pub triangles: Vec<[i32; 3]>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an indexed mesh from an STL file
    pub fn from_stl<P: AsRef<Path>>(path: P) -> Result<Self, MeshError> {
        let mut file = std::fs::File::open(path)
            .map_err(|e| MeshError::LoadError(e.to_string()))?;

        let stl = stl_io::read_stl(&mut file)
            .map_err(|e| MeshError::LoadError(e.to_string()))?;

        if stl.faces.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        let vertices = stl
            .vertices
            .iter()
            .map(|v| Point3D::new(v[0] as f64, v[1] as f64, v[2] as f64))
            .collect();

        let triangles = stl
            .faces
            .iter()
            .map(|face| {
                [
                    face.vertices[0] as i32,
                    face.vertices[1] as i32,
                    face.vertices[2] as i32,
                ]
            })
            .collect();

        Ok(Self { vertices, triangles })
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Materialize the triangle at `idx`
    pub fn triangle(&self, idx: usize) -> Triangle {
        let [a, b, c] = self.triangles[idx];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    pub fn iter_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangles.len()).map(|i| self.triangle(i))
    }

    /// Append another mesh, rebasing its triangle indices onto the combined
    /// vertex list
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as i32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Translate all vertices by `offset`
    pub fn translate(&mut self, offset: Vector3D) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Rotate all vertices by `rotation`, then translate by `offset`
    pub fn transform(&mut self, rotation: &UnitQuaternion<f64>, offset: Vector3D) {
        for v in &mut self.vertices {
            *v = rotation * *v + offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn single_triangle() -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(1.0, 0.0, 0.0),
                Point3D::new(0.0, 1.0, 0.0),
            ],
            triangles: vec![[0, 1, 2]],
        }
    }

    #[test]
    fn test_merge_rebases_indices() {
        let mut mesh = single_triangle();
        let other = single_triangle();
        mesh.merge(&other);

        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1], [3, 4, 5]);
    }

    #[test]
    fn test_translate() {
        let mut mesh = single_triangle();
        mesh.translate(Vector3D::new(10.0, 0.0, -1.0));

        assert_eq!(mesh.vertices[1], Point3D::new(11.0, 0.0, -1.0));
    }

    #[test]
    fn test_transform_rotates_then_translates() {
        let mut mesh = single_triangle();
        // quarter turn around Z maps +X onto +Y
        let rot = UnitQuaternion::from_axis_angle(&Vector3D::z_axis(), PI / 2.0);
        mesh.transform(&rot, Vector3D::new(0.0, 0.0, 5.0));

        let p = mesh.vertices[1];
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
        assert!((p.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_materialization() {
        let mesh = single_triangle();
        let tri = mesh.triangle(0);

        assert_eq!(tri.v1, Point3D::new(1.0, 0.0, 0.0));
    }
}
