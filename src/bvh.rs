//! Bounding-volume construction.
//!
//! Recursive longest-axis median split over the triangle table. The
//! recursion never materializes interior nodes: at the stop depth it
//! records one bounding box plus a triangle count per leaf region, and the
//! triangle table ends up ordered so each leaf owns a contiguous slice.

use log::debug;

use crate::scene::Tri;
use crate::util::math::Aabb;
use crate::util::{Error, Result};

/// One leaf bounding volume: an AABB plus the number of triangles inside.
#[derive(Debug, Clone, Copy)]
pub struct Bv {
    pub bb: Aabb,
    pub ntris: u32,
}

/// Build the flat BV table over `tris`, reordering the slice in place.
///
/// `max_bv` caps the number of leaves and must be a power of two. The
/// produced leaf count is `2^stop_depth`, with the stop depth reduced so
/// no leaf is ever empty: splitting `n` triangles deeper than
/// `ulog2(n) - 1` would produce single-triangle (and eventually empty)
/// regions.
pub fn build(tris: &mut [Tri], max_bv: u32) -> Result<Vec<Bv>> {
    if !max_bv.is_power_of_two() {
        return Err(Error::config("max-bv is not a power of 2"));
    }
    debug_assert!(!tris.is_empty());

    let mut stop_depth = max_bv.ilog2();
    let full_depth = (tris.len() as u32).ilog2();
    if stop_depth >= full_depth && stop_depth > 0 {
        stop_depth = full_depth.saturating_sub(1);
    }

    let mut volumes = Vec::with_capacity(1 << stop_depth);
    gather(tris, 0, stop_depth, &mut volumes);

    debug!(
        "{} bounding volumes over {} triangles (stop depth {})",
        volumes.len(),
        tris.len(),
        stop_depth
    );
    Ok(volumes)
}

/// Partition `tris` about the median of its bbox centers along the
/// longest axis, recursing until `stop_depth`, where one leaf is emitted.
fn gather(tris: &mut [Tri], depth: u32, stop_depth: u32, out: &mut Vec<Bv>) {
    let mut bb = Aabb::EMPTY;
    for t in tris.iter() {
        bb.grow(&t.bb);
    }

    let axis = bb.longest_axis();
    tris.sort_unstable_by(|a, b| a.bb.center()[axis].total_cmp(&b.bb.center()[axis]));

    if depth == stop_depth {
        out.push(Bv {
            bb,
            ntris: tris.len() as u32,
        });
        return;
    }

    let (lo, hi) = tris.split_at_mut(tris.len() / 2);
    gather(lo, depth + 1, stop_depth, out);
    gather(hi, depth + 1, stop_depth, out);
}
