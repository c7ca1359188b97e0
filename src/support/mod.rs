// Support generation module
// SLA support scaffolds: pinheads on the model, pillars to the build
// plate, junctions and bridges knitting the pillars together

pub mod controller;
pub mod elements;
mod planner;

pub use controller::{ChannelController, Command, Controller, Unattended};
pub use elements::{Bridge, Head, Junction, Pillar, Tail};

use crate::geometry::Point3D;
use crate::mesh::TriangleMesh;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for support generation. Lengths are millimetres, angles
/// radians.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    /// Radius of the small sphere touching the model
    pub head_front_radius_mm: f64,

    /// Radius of the back sphere a pillar hangs from
    pub head_back_radius_mm: f64,

    /// Length of the straight section between the two head spheres
    pub head_width_mm: f64,

    /// Requested pillar radius; clipped per head so a pillar never grows
    /// thicker than its head
    pub pillar_radius_mm: f64,

    /// Radius of the flared pad where a pillar meets the build plate
    pub base_radius_mm: f64,

    /// Height of the flared pad
    pub base_height_mm: f64,

    /// Bridge slope; a positive tilt lowers the far bridge endpoint
    pub tilt: f64,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            head_front_radius_mm: 0.5,
            head_back_radius_mm: 1.0,
            head_width_mm: 2.0,
            pillar_radius_mm: 0.8,
            base_radius_mm: 2.0,
            base_height_mm: 3.0,
            tilt: PI / 4.0,
        }
    }
}

/// The generated support scaffold: four append-only element collections.
/// Indices are stable for the lifetime of a planning run, and the tree
/// exclusively owns every element record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportTree {
    heads: Vec<Head>,
    pillars: Vec<Pillar>,
    junctions: Vec<Junction>,
    bridges: Vec<Bridge>,
}

impl SupportTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the planning pipeline for `object` and the user's anchor
    /// points, appending the produced elements to this tree. Returns true
    /// iff the controller aborted the run.
    pub fn generate(
        &mut self,
        object: &TriangleMesh,
        anchor_points: &[Point3D],
        cfg: &SupportConfig,
        ctl: &dyn Controller,
    ) -> bool {
        planner::generate(self, object, anchor_points, cfg, ctl)
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
            && self.pillars.is_empty()
            && self.junctions.is_empty()
            && self.bridges.is_empty()
    }

    pub fn heads(&self) -> &[Head] {
        &self.heads
    }

    pub fn head(&self, idx: usize) -> &Head {
        &self.heads[idx]
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn bridges(&self) -> &[Bridge] {
        &self.bridges
    }

    pub(crate) fn add_head(&mut self, head: Head) -> usize {
        self.heads.push(head);
        self.heads.len() - 1
    }

    pub(crate) fn head_mut(&mut self, idx: usize) -> &mut Head {
        &mut self.heads[idx]
    }

    /// Build a pillar hanging from the head at `head_id` down to
    /// `endpoint`. The head index is recorded on the pillar.
    pub(crate) fn add_pillar(&mut self, head_id: usize, endpoint: Point3D, radius: f64) -> usize {
        let pillar = Pillar::from_head(&self.heads[head_id], head_id, endpoint, radius);
        self.pillars.push(pillar);
        self.pillars.len() - 1
    }

    pub(crate) fn pillar_mut(&mut self, idx: usize) -> &mut Pillar {
        &mut self.pillars[idx]
    }

    pub(crate) fn add_junction(&mut self, pos: Point3D, r: f64) -> usize {
        self.junctions
            .push(Junction::new(pos, r, elements::DEFAULT_STEPS));
        self.junctions.len() - 1
    }

    pub(crate) fn add_bridge(&mut self, j1: usize, j2: usize, r: f64) -> usize {
        let bridge = Bridge::new(&self.junctions[j1], &self.junctions[j2], r);
        self.bridges.push(bridge);
        self.bridges.len() - 1
    }

    /// Every non-empty element mesh, in element order: heads (with their
    /// tails), pillars (with their bases), junctions, bridges. A host can
    /// add each as a separate scene volume.
    pub fn meshes(&self) -> impl Iterator<Item = &TriangleMesh> + '_ {
        let heads = self
            .heads
            .iter()
            .flat_map(|h| [&h.mesh, &h.tail.mesh]);
        let pillars = self.pillars.iter().flat_map(|p| [&p.mesh, &p.base]);
        let junctions = self.junctions.iter().map(|j| &j.mesh);
        let bridges = self.bridges.iter().map(|b| &b.mesh);

        heads
            .chain(pillars)
            .chain(junctions)
            .chain(bridges)
            .filter(|m| !m.is_empty())
    }

    /// All element meshes merged into a single fragment
    pub fn merged(&self) -> TriangleMesh {
        let mut out = TriangleMesh::new();
        for mesh in self.meshes() {
            out.merge(mesh);
        }
        out
    }
}
