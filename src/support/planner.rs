// The support planning pipeline: a resumable state machine that turns the
// anchor set into pinheads, pillars, junctions and bridges.

use crate::cluster::{cluster, cluster_centroid};
use crate::geometry::{to_xy, xy_distance, Point3D, Vector3D};
use crate::hull::pts_convex_hull;
use crate::mesh::TriangleMesh;
use crate::raycast::{normals, ray_mesh_intersect};
use crate::spatial::SpatialIndex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::controller::{Command, Controller};
use super::elements::{Head, DEFAULT_STEPS};
use super::{SupportConfig, SupportTree};

/// Anchors closer than this are aliases of the same support point
pub(crate) const D_SP: f64 = 0.1;
/// Clearance rays start this far off the surface
const RAY_EPS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    Begin,
    Filter,
    Pinheads,
    Classify,
    RoutingGround,
    RoutingNonground,
    Headless,
    Done,
    Halt,
    Abort,
}

impl State {
    fn label(self) -> &'static str {
        match self {
            State::Begin => "",
            State::Filter => "Filtering",
            State::Pinheads => "Generate pinheads",
            State::Classify => "Classification",
            State::RoutingGround => "Routing to ground",
            State::RoutingNonground => "Routing supports to model surface",
            State::Headless => "Processing small holes",
            State::Done => "Done",
            State::Halt => "Halt",
            State::Abort => "Abort",
        }
    }

    fn percent(self) -> u32 {
        match self {
            State::Begin => 0,
            State::Filter => 10,
            State::Pinheads => 30,
            State::Classify => 50,
            State::RoutingGround => 60,
            State::RoutingNonground => 70,
            State::Headless => 80,
            State::Done => 100,
            State::Halt | State::Abort => 0,
        }
    }
}

/// Scratch workspace shared by the pipeline states. Serializable so a
/// paused run can be persisted between states.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PlanContext {
    filtered_points: Vec<Point3D>,
    filtered_normals: Vec<Vector3D>,
    head_positions: Vec<Point3D>,
    headless_positions: Vec<Point3D>,
    /// Heads whose downward ray reaches the build plate
    ground_heads: Vec<usize>,
    /// Heads whose downward ray hits the model first
    noground_heads: Vec<usize>,
    /// Downward ray distances, one per head
    head_heights: Vec<f64>,
    /// XY clusters of ground heads, as indices into `ground_heads`
    ground_clusters: Vec<Vec<usize>>,
}

/// Run the planning state machine. Returns true iff the run was aborted by
/// the controller; the tree holds whatever elements were produced.
pub(crate) fn generate(
    tree: &mut SupportTree,
    object: &TriangleMesh,
    anchor_points: &[Point3D],
    cfg: &SupportConfig,
    ctl: &dyn Controller,
) -> bool {
    if anchor_points.is_empty()
        || cfg.head_back_radius_mm < 1e-6
        || cfg.head_front_radius_mm < 1e-6
    {
        log::info!("support planning skipped: nothing to support");
        return false;
    }

    let mut ctx = PlanContext::default();
    let mut pc = State::Begin;
    let mut pc_prev = State::Begin;

    while pc < State::Done || pc == State::Halt {
        // commands are exchanged only at state boundaries; an in-flight
        // state always runs to completion
        match ctl.next_command(pc == State::Halt) {
            Command::StartResume => {
                pc = match pc {
                    State::Begin => State::Filter,
                    State::Filter => State::Pinheads,
                    State::Pinheads => State::Classify,
                    State::Classify => State::RoutingGround,
                    State::RoutingGround => State::RoutingNonground,
                    State::RoutingNonground => State::Headless,
                    State::Headless => State::Done,
                    State::Halt => pc_prev,
                    other => other,
                };
                ctl.status(pc.percent(), pc.label());
            }
            Command::Pause => {
                pc_prev = pc;
                pc = State::Halt;
                ctl.status(pc.percent(), pc.label());
            }
            Command::Stop => {
                pc = State::Abort;
                ctl.status(pc.percent(), pc.label());
            }
            Command::Synch => {
                pc = State::Begin;
                ctx = PlanContext::default();
                *tree = SupportTree::new();
            }
        }

        match pc {
            State::Filter => filter_step(cfg, anchor_points, object, &mut ctx),
            State::Pinheads => pinhead_step(cfg, &mut ctx, tree),
            State::Classify => classify_step(cfg, object, &mut ctx, tree),
            State::RoutingGround => routing_ground_step(cfg, object, &ctx, tree),
            State::RoutingNonground => {
                log::debug!("routing supports to the model surface is not implemented");
            }
            State::Headless => {
                log::debug!(
                    "{} headless anchors left unprocessed",
                    ctx.headless_positions.len()
                );
            }
            _ => {}
        }
    }

    pc == State::Abort
}

/// FILTER: deduplicate the anchors, correct their normals and sort them
/// into head-capable and headless buckets
fn filter_step(
    cfg: &SupportConfig,
    points: &[Point3D],
    mesh: &TriangleMesh,
    ctx: &mut PlanContext,
) {
    // anchors closer than D_SP collapse to the first member of their group
    let aliases = cluster(points, |a, b| (b - a).norm() < D_SP, 0);
    ctx.filtered_points = aliases.iter().map(|cl| points[cl[0]]).collect();
    log::info!(
        "filtering: {} anchors, {} after deduplication",
        points.len(),
        ctx.filtered_points.len()
    );

    let nmls = normals(&ctx.filtered_points, mesh);

    ctx.filtered_normals.clear();
    ctx.head_positions.clear();
    ctx.headless_positions.clear();

    let w = cfg.head_width_mm + cfg.head_back_radius_mm + 2.0 * cfg.head_front_radius_mm;

    for (i, n) in nmls.iter().enumerate() {
        let polar = n.z.clamp(-1.0, 1.0).acos();
        let azimuth = n.y.atan2(n.x);

        // an anchor whose surface faces upward cannot hold a pinhead
        if polar < PI / 2.0 {
            continue;
        }

        // saturate the tilt so the head never leans more than 135 degrees
        // from straight up, then rebuild the corrected normal
        let polar = polar.max(3.0 * PI / 4.0);
        let nn = Vector3D::new(
            azimuth.cos() * polar.sin(),
            azimuth.sin() * polar.sin(),
            polar.cos(),
        );

        let hp = ctx.filtered_points[i];

        // room for both the lower and the upper pinhead along the normal?
        let t = ray_mesh_intersect(&(hp + RAY_EPS * nn), &nn, mesh);
        if t > 2.0 * w || t.is_infinite() {
            ctx.head_positions.push(hp);
            ctx.filtered_normals.push(nn);
        } else {
            ctx.headless_positions.push(hp);
        }
    }

    log::info!(
        "filtering: {} head-capable anchors, {} headless",
        ctx.head_positions.len(),
        ctx.headless_positions.len()
    );
}

/// PINHEADS: append one head record per surviving anchor. Heads are not
/// transformed yet; classification still reads them in canonical space.
fn pinhead_step(cfg: &SupportConfig, ctx: &mut PlanContext, tree: &mut SupportTree) {
    for i in 0..ctx.head_positions.len() {
        tree.add_head(Head::new(
            cfg.head_back_radius_mm,
            cfg.head_front_radius_mm,
            cfg.head_width_mm,
            ctx.filtered_normals[i],
            ctx.head_positions[i],
            DEFAULT_STEPS,
        ));
    }
    log::debug!("generated {} pinheads", tree.heads().len());
}

/// CLASSIFY: split heads into ground-reaching and airborne, stand airborne
/// heads on the model through a short pillar with an upside-down cap head,
/// and group the ground heads into pillar-sharing clusters
fn classify_step(
    cfg: &SupportConfig,
    mesh: &TriangleMesh,
    ctx: &mut PlanContext,
    tree: &mut SupportTree,
) {
    ctx.head_heights.clear();
    ctx.ground_heads.clear();
    ctx.noground_heads.clear();

    let down = Vector3D::new(0.0, 0.0, -1.0);
    for i in 0..ctx.head_positions.len() {
        let start = tree.head(i).junction_point();
        let t = ray_mesh_intersect(&start, &down, mesh);
        ctx.head_heights.push(t);
        if t.is_infinite() {
            ctx.ground_heads.push(i);
        } else {
            ctx.noground_heads.push(i);
        }
    }
    log::info!(
        "classification: {} heads reach the ground, {} are airborne",
        ctx.ground_heads.len(),
        ctx.noground_heads.len()
    );

    // clusters of ground heads close enough in XY to share a pillar base
    let gnd: Vec<Point3D> = ctx
        .ground_heads
        .iter()
        .map(|&i| ctx.head_positions[i])
        .collect();
    let d_base = 4.0 * cfg.base_radius_mm;
    ctx.ground_clusters = cluster(&gnd, |a, b| xy_distance(a, b) < d_base, 4);

    for &idx in &ctx.noground_heads {
        let gh = ctx.head_heights[idx];
        {
            let head = tree.head_mut(idx);
            head.transform();
            head.add_tail(None, None);
        }

        let head = tree.head(idx);
        let headend = head.junction_point();
        let hl = head.full_width() - head.r_back;

        // an auxiliary upward head caps the pillar where it meets the
        // model surface below
        let mut cap = Head::new(
            cfg.head_back_radius_mm,
            cfg.head_front_radius_mm,
            cfg.head_width_mm,
            Vector3D::new(0.0, 0.0, 1.0),
            Point3D::new(headend.x, headend.y, headend.z - gh - cfg.head_front_radius_mm),
            DEFAULT_STEPS,
        );
        cap.transform();

        let endpoint = Point3D::new(headend.x, headend.y, headend.z - gh + hl);
        let pillar_id = tree.add_pillar(idx, endpoint, cfg.pillar_radius_mm);
        tree.pillar_mut(pillar_id).base = cap.mesh;
    }
}

/// ROUTING_GROUND: one shared pillar per cluster, side heads wired to it
/// with tilted bridges, then the pillar field knitted together ring by
/// concentric ring
fn routing_ground_step(
    cfg: &SupportConfig,
    mesh: &TriangleMesh,
    ctx: &PlanContext,
    tree: &mut SupportTree,
) {
    let hbr = cfg.head_back_radius_mm;
    let gnd_head_pt = |i: usize| ctx.head_positions[ctx.ground_heads[i]];

    let mut central_pillars: Vec<usize> = Vec::with_capacity(ctx.ground_clusters.len());

    for cl in &ctx.ground_clusters {
        let Some(cidx) = cluster_centroid(cl, &gnd_head_pt, |a, b| xy_distance(a, b)) else {
            continue;
        };

        // the elected centroid head carries the cluster's pillar to the
        // build plate
        let head_id = ctx.ground_heads[cl[cidx]];
        {
            let head = tree.head_mut(head_id);
            head.transform();
            head.add_tail(None, None);
        }
        let central_jp = tree.head(head_id).junction_point();
        let endpoint = Point3D::new(central_jp.x, central_jp.y, 0.0);
        let pillar_id = tree.add_pillar(head_id, endpoint, cfg.pillar_radius_mm);
        tree.pillar_mut(pillar_id)
            .add_base(cfg.base_height_mm, cfg.base_radius_mm);
        central_pillars.push(pillar_id);

        for (k, &c) in cl.iter().enumerate() {
            if k == cidx {
                continue;
            }

            let side_id = ctx.ground_heads[c];
            {
                let head = tree.head_mut(side_id);
                head.transform();
                head.add_tail(None, None);
            }
            let sidehead = tree.head(side_id);
            let r_pillar = sidehead.request_pillar_radius(cfg.pillar_radius_mm);

            // junction one head-length below the side head
            let mut jp = sidehead.junction_point();
            jp.z -= sidehead.full_width();

            // hit the central pillar with a tilted bridge
            let d = xy_distance(&jp, &central_jp);
            let jn = Point3D::new(central_jp.x, central_jp.y, jp.z + d * (-cfg.tilt).sin());

            if jn.z > 0.0 {
                let jjp = tree.add_junction(jp, hbr);
                tree.add_pillar(side_id, jp, cfg.pillar_radius_mm);
                let jjn = tree.add_junction(jn, hbr);
                tree.add_bridge(jjp, jjn, r_pillar);
            } else {
                // no headroom for the connection; dense clusters near the
                // plate get dedicated pillars instead
                jp.z = 0.0;
                let side_pillar = tree.add_pillar(side_id, jp, cfg.pillar_radius_mm);
                tree.pillar_mut(side_pillar)
                    .add_base(cfg.base_height_mm, cfg.base_radius_mm);
            }
        }
    }

    // Breaking the pillar positions into concentric rings and only bridging
    // neighbors within a ring keeps the bridges from crossing each other.
    let mut junction_index = SpatialIndex::new();
    for (i, junction) in tree.junctions().iter().enumerate() {
        junction_index.insert(
            Point3D::new(junction.pos.x, junction.pos.y, 0.0),
            i as u32,
        );
    }

    let slope = (-cfg.tilt).sin();

    let mut rem = central_pillars;
    while !rem.is_empty() {
        rem.sort_unstable();
        let ring = pts_convex_hull(&rem, |i| to_xy(&tree.pillars()[i].endpoint));
        log::debug!("bridging a ring of {} pillars", ring.len());

        for pair in ring.windows(2) {
            let (pid, nid) = (pair[0], pair[1]);

            let (p_end, p_r, p_head_jp) = {
                let pillar = &tree.pillars()[pid];
                (
                    pillar.endpoint,
                    pillar.r,
                    tree.head(pillar.head_id).junction_point(),
                )
            };
            let (n_end, n_start_z) = {
                let pillar = &tree.pillars()[nid];
                (
                    pillar.endpoint,
                    tree.head(pillar.head_id).junction_point().z,
                )
            };

            // start from the highest junction already sitting on this
            // pillar, or from the head when there is none
            let d = 2.0 * p_r;
            let pp = Point3D::new(p_end.x, p_end.y, 0.0);
            let mut start: Option<usize> = None;
            for &(_, id) in &junction_index.within_radius(&pp, d) {
                let id = id as usize;
                match start {
                    Some(s) if tree.junctions()[id].pos.z <= tree.junctions()[s].pos.z => {}
                    _ => start = Some(id),
                }
            }
            let mut sj = start
                .map(|id| tree.junctions()[id].pos)
                .unwrap_or(p_head_jp);

            let mut ej = n_end;
            let pillar_dist = xy_distance(&sj, &ej);
            // stacked pillars have nothing to span; a non-descending slope
            // would never meet the next pillar
            if pillar_dist < 1e-9 || slope >= 0.0 {
                continue;
            }
            ej.z = sj.z + pillar_dist * slope;

            let mut chkd = ray_mesh_intersect(&sj, &(ej - sj).normalize(), mesh);

            // zig-zag down both pillars, bridging at every level with
            // enough clearance
            while n_end.z < ej.z && p_end.z < sj.z {
                if chkd >= pillar_dist && n_start_z > ej.z {
                    let js = tree.add_junction(sj, hbr);
                    let je = tree.add_junction(ej, hbr);
                    tree.add_bridge(js, je, p_r);
                }

                std::mem::swap(&mut sj, &mut ej);
                ej.z = sj.z + pillar_dist * slope;
                chkd = ray_mesh_intersect(&sj, &(ej - sj).normalize(), mesh);
            }
        }

        // peel the hull off and bridge the next ring inside it
        let mut walked = ring;
        walked.sort_unstable();
        rem.retain(|i| walked.binary_search(i).is_err());
    }

    log::info!(
        "routing to ground: {} pillars, {} junctions, {} bridges",
        tree.pillars().len(),
        tree.junctions().len(),
        tree.bridges().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::controller::{ChannelController, Unattended};

    /// Axis-aligned box with outward-facing triangles
    fn boxmesh(x0: f64, x1: f64, y0: f64, y1: f64, z0: f64, z1: f64) -> TriangleMesh {
        TriangleMesh {
            vertices: vec![
                Point3D::new(x0, y0, z0),
                Point3D::new(x1, y0, z0),
                Point3D::new(x1, y1, z0),
                Point3D::new(x0, y1, z0),
                Point3D::new(x0, y0, z1),
                Point3D::new(x1, y0, z1),
                Point3D::new(x1, y1, z1),
                Point3D::new(x0, y1, z1),
            ],
            triangles: vec![
                [0, 2, 1],
                [0, 3, 2], // bottom
                [4, 5, 6],
                [4, 6, 7], // top
                [0, 1, 5],
                [0, 5, 4], // front
                [2, 3, 7],
                [2, 7, 6], // back
                [0, 4, 7],
                [0, 7, 3], // left
                [1, 2, 6],
                [1, 6, 5], // right
            ],
        }
    }

    fn run(object: &TriangleMesh, anchors: &[Point3D]) -> SupportTree {
        let mut tree = SupportTree::new();
        let aborted = tree.generate(object, anchors, &SupportConfig::default(), &Unattended);
        assert!(!aborted);
        tree
    }

    #[test]
    fn test_single_anchor_gets_pillar_with_base() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        let tree = run(&plate, &[Point3D::new(0.0, 0.0, 10.0)]);

        assert_eq!(tree.heads().len(), 1);
        assert_eq!(tree.pillars().len(), 1);
        assert_eq!(tree.junctions().len(), 0);
        assert_eq!(tree.bridges().len(), 0);

        let pillar = &tree.pillars()[0];
        assert!(pillar.has_base());
        assert!((pillar.endpoint - Point3D::new(0.0, 0.0, 0.0)).norm() < 1e-9);

        // pillars stay strictly vertical
        let steps = pillar.steps;
        for i in 0..steps {
            let top = pillar.mesh.vertices[i];
            let bottom = pillar.mesh.vertices[i + steps];
            assert!((top.x - bottom.x).abs() < 1e-9);
            assert!((top.y - bottom.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_close_anchors_are_deduplicated() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        let anchors = [
            Point3D::new(0.0, 0.0, 10.0),
            Point3D::new(0.05, 0.0, 10.0),
        ];
        let tree = run(&plate, &anchors);

        assert_eq!(tree.heads().len(), 1);
        // the first anchor of the pair is the one kept
        assert!((tree.heads()[0].translation - anchors[0]).norm() < 1e-12);
    }

    #[test]
    fn test_upward_facing_anchor_is_dropped() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 4.0, 5.0);
        // top face normal points up; no support possible there
        let tree = run(&plate, &[Point3D::new(0.0, 0.0, 5.0)]);

        assert!(tree.is_empty());
    }

    #[test]
    fn test_anchor_without_headroom_goes_headless() {
        let mut object = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        // a second slab right below leaves less than two head-lengths of room
        object.merge(&boxmesh(-5.0, 5.0, -5.0, 5.0, 5.0, 6.0));

        let tree = run(&object, &[Point3D::new(0.0, 0.0, 10.0)]);

        // headless anchors produce no elements in this core
        assert!(tree.is_empty());
    }

    #[test]
    fn test_normal_saturation_caps_head_tilt() {
        // a single face sloped 60 degrees from vertical; its polar angle
        // (120 degrees) is supportable but under the 135-degree saturation
        let u = Vector3D::new(0.0, 1.0, 0.0);
        let v = Vector3D::new(0.5, 0.0, 0.75_f64.sqrt());
        let p0 = Point3D::new(0.0, 0.0, 10.0);
        let object = TriangleMesh {
            vertices: vec![p0, p0 + 5.0 * u, p0 + 5.0 * v],
            triangles: vec![[0, 1, 2]],
        };
        let anchor = Point3D::from(
            (p0.coords + (p0 + 5.0 * u).coords + (p0 + 5.0 * v).coords) / 3.0,
        );

        let tree = run(&object, &[anchor]);

        assert_eq!(tree.heads().len(), 1);
        let dir = tree.heads()[0].direction;
        assert!((dir.z - (3.0 * PI / 4.0).cos()).abs() < 1e-9);
        assert!(dir.z <= (3.0 * PI / 4.0).cos() + 1e-9);
    }

    #[test]
    fn test_airborne_anchor_stands_on_model() {
        let mut object = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        // model surface far enough below for a full pinhead, so the head is
        // airborne rather than headless
        object.merge(&boxmesh(-5.0, 5.0, -5.0, 5.0, 0.0, 1.0));

        let tree = run(&object, &[Point3D::new(0.0, 0.0, 10.0)]);

        assert_eq!(tree.heads().len(), 1);
        assert_eq!(tree.pillars().len(), 1);
        assert_eq!(tree.junctions().len(), 0);
        assert_eq!(tree.bridges().len(), 0);

        let head = &tree.heads()[0];
        let pillar = &tree.pillars()[0];

        // the pillar stops where the cap head meets the model, not at z=0
        let expected_z = head.junction_point().z - 5.0 + (head.full_width() - head.r_back);
        assert!((pillar.endpoint.z - expected_z).abs() < 1e-9);
        // the cap head's mesh rides along as the pillar base
        assert!(pillar.has_base());
    }

    #[test]
    fn test_cluster_routes_side_heads_over_bridges() {
        let plate = boxmesh(-10.0, 10.0, -10.0, 10.0, 20.0, 21.0);
        // 3-4-5 triangle: pairwise distances 6, 5, 5 keep all three anchors
        // in one cluster, and the last one is the most central
        let anchors = [
            Point3D::new(0.0, 0.0, 20.0),
            Point3D::new(6.0, 0.0, 20.0),
            Point3D::new(3.0, 4.0, 20.0),
        ];
        let tree = run(&plate, &anchors);
        let cfg = SupportConfig::default();

        assert_eq!(tree.heads().len(), 3);
        assert_eq!(tree.pillars().len(), 3);
        assert_eq!(tree.junctions().len(), 4);
        assert_eq!(tree.bridges().len(), 2);

        // exactly one pillar reaches the plate with a flared base
        let based: Vec<_> = tree.pillars().iter().filter(|p| p.has_base()).collect();
        assert_eq!(based.len(), 1);
        assert!((based[0].endpoint.x - 3.0).abs() < 1e-9);
        assert!((based[0].endpoint.y - 4.0).abs() < 1e-9);

        // each bridge honors the configured tilt
        for pair in tree.junctions().chunks(2) {
            let (jp, jn) = (&pair[0], &pair[1]);
            let d = xy_distance(&jp.pos, &jn.pos);
            assert!(((jn.pos.z - jp.pos.z) - d * (-cfg.tilt).sin()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ring_of_pillars_is_bridged_pairwise() {
        let plate = boxmesh(-25.0, 25.0, -25.0, 25.0, 15.0, 16.0);
        // nine anchors on a circle, far enough apart to get their own
        // pillars, forming a single convex-hull ring
        let anchors: Vec<Point3D> = (0..9)
            .map(|k| {
                let a = 2.0 * PI * k as f64 / 9.0;
                Point3D::new(20.0 * a.cos(), 20.0 * a.sin(), 15.0)
            })
            .collect();
        let tree = run(&plate, &anchors);

        assert_eq!(tree.heads().len(), 9);
        assert_eq!(tree.pillars().len(), 9);
        assert!(tree.pillars().iter().all(|p| p.has_base()));

        // the hull walk is open: eight consecutive pairs, one bridge each
        assert_eq!(tree.bridges().len(), 8);
        assert_eq!(tree.junctions().len(), 16);
    }

    #[test]
    fn test_inner_ring_is_peeled_after_the_outer() {
        let plate = boxmesh(-15.0, 30.0, -15.0, 30.0, 20.0, 21.0);
        // four corner pillars and one in the middle; the center is left for
        // a second, inner ring and stays unbridged
        let anchors = [
            Point3D::new(0.0, 0.0, 20.0),
            Point3D::new(20.0, 0.0, 20.0),
            Point3D::new(20.0, 20.0, 20.0),
            Point3D::new(0.0, 20.0, 20.0),
            Point3D::new(10.0, 10.0, 20.0),
        ];
        let tree = run(&plate, &anchors);

        assert_eq!(tree.pillars().len(), 5);
        assert_eq!(tree.bridges().len(), 3);
        assert_eq!(tree.junctions().len(), 6);
    }

    #[test]
    fn test_identical_runs_are_deterministic() {
        let plate = boxmesh(-10.0, 10.0, -10.0, 10.0, 20.0, 21.0);
        let anchors = [
            Point3D::new(0.0, 0.0, 20.0),
            Point3D::new(6.0, 0.0, 20.0),
            Point3D::new(3.0, 4.0, 20.0),
        ];

        let first = run(&plate, &anchors);
        let second = run(&plate, &anchors);

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_anchor_set_yields_empty_tree() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 4.0, 5.0);
        let tree = run(&plate, &[]);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_stop_command_aborts_the_run() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        let (ctl, tx) = ChannelController::new();
        tx.send(Command::Stop).unwrap();

        let mut tree = SupportTree::new();
        let aborted = tree.generate(
            &plate,
            &[Point3D::new(0.0, 0.0, 10.0)],
            &SupportConfig::default(),
            &ctl,
        );

        assert!(aborted);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_pause_and_resume_completes_the_run() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        let (ctl, tx) = ChannelController::new();
        tx.send(Command::Pause).unwrap();
        tx.send(Command::StartResume).unwrap();

        let mut tree = SupportTree::new();
        let aborted = tree.generate(
            &plate,
            &[Point3D::new(0.0, 0.0, 10.0)],
            &SupportConfig::default(),
            &ctl,
        );
        drop(tx);

        assert!(!aborted);
        assert_eq!(tree.heads().len(), 1);
    }

    #[test]
    fn test_synch_restarts_and_still_completes() {
        let plate = boxmesh(-5.0, 5.0, -5.0, 5.0, 10.0, 11.0);
        let (ctl, tx) = ChannelController::new();
        tx.send(Command::Synch).unwrap();

        let mut tree = SupportTree::new();
        let aborted = tree.generate(
            &plate,
            &[Point3D::new(0.0, 0.0, 10.0)],
            &SupportConfig::default(),
            &ctl,
        );
        drop(tx);

        assert!(!aborted);
        assert_eq!(tree.heads().len(), 1);
        assert_eq!(tree.pillars().len(), 1);
    }
}
