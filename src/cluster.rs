// Clustering of anchor and head points

use crate::geometry::Point3D;

/// Partition `points` into clusters: connected components of the graph
/// whose edges are the index pairs accepted by `near`. With a nonzero
/// `max_per_cluster`, oversized components keep their first members and
/// the excess points become singleton clusters. Member lists are sorted
/// and clusters appear in order of their lowest member index.
pub fn cluster<F>(points: &[Point3D], near: F, max_per_cluster: usize) -> Vec<Vec<usize>>
where
    F: Fn(&Point3D, &Point3D) -> bool,
{
    let mut assigned = vec![false; points.len()];
    let mut clusters = Vec::new();

    for i in 0..points.len() {
        if assigned[i] {
            continue;
        }

        let mut component = vec![i];
        assigned[i] = true;

        // breadth-first walk over the proximity graph
        let mut cursor = 0;
        while cursor < component.len() {
            let current = component[cursor];
            cursor += 1;
            for j in 0..points.len() {
                if !assigned[j] && near(&points[current], &points[j]) {
                    assigned[j] = true;
                    component.push(j);
                }
            }
        }

        component.sort_unstable();

        if max_per_cluster > 0 && component.len() > max_per_cluster {
            let rest = component.split_off(max_per_cluster);
            clusters.push(component);
            clusters.extend(rest.into_iter().map(|idx| vec![idx]));
        } else {
            clusters.push(component);
        }
    }

    clusters
}

/// Elect the member of a cluster with the smallest mean distance to all
/// other members, under the caller's distance function. Returns the
/// position within `members`; `None` for an empty cluster, index 0 for
/// one- and two-member clusters, and the lowest index on ties.
pub fn cluster_centroid<P, D>(members: &[usize], point_of: P, dist: D) -> Option<usize>
where
    P: Fn(usize) -> Point3D,
    D: Fn(&Point3D, &Point3D) -> f64,
{
    match members.len() {
        0 => return None,
        1 | 2 => return Some(0),
        _ => {}
    }

    let mut sums = vec![0.0; members.len()];
    for a in 0..members.len() {
        for b in (a + 1)..members.len() {
            let d = dist(&point_of(members[a]), &point_of(members[b]));
            sums[a] += d;
            sums[b] += d;
        }
    }

    let n = members.len() as f64;
    let mut best = 0;
    for (i, sum) in sums.iter().enumerate().skip(1) {
        if sum / n < sums[best] / n {
            best = i;
        }
    }

    Some(best)
}
