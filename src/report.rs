//! BV-efficiency diagnostic.
//!
//! Casts one primary ray per pixel and counts how many bounding volumes
//! each ray hits. A partition where rays regularly pierce many volumes
//! sends the renderer chasing triangles it never needed.

use std::fmt;

use crate::scene::Scene;

/// Aggregate ray/BV intersection statistics over the pixel grid.
#[derive(Debug, Default)]
pub struct BvReport {
    pub rays: u64,
    pub total_hits: u64,
    pub max_hits: u32,
    pub zero_hit_rays: u64,
    pub volumes: usize,
    pub min_tris: u32,
    pub max_tris: u32,
    pub total_tris: u64,
}

impl BvReport {
    /// Mean number of volumes hit per primary ray.
    pub fn mean_hits(&self) -> f64 {
        if self.rays == 0 {
            0.0
        } else {
            self.total_hits as f64 / self.rays as f64
        }
    }
}

impl fmt::Display for BvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} volumes over {} triangles (per volume: min {}, avg {:.1}, max {})",
            self.volumes,
            self.total_tris,
            self.min_tris,
            self.total_tris as f64 / self.volumes.max(1) as f64,
            self.max_tris
        )?;
        writeln!(f, "{} primary rays", self.rays)?;
        writeln!(
            f,
            "volume hits per ray: avg {:.2}, max {}",
            self.mean_hits(),
            self.max_hits
        )?;
        writeln!(
            f,
            "rays missing every volume: {} ({:.1}%)",
            self.zero_hit_rays,
            100.0 * self.zero_hit_rays as f64 / self.rays.max(1) as f64
        )
    }
}

/// Survey the scene: one ray through the center of every pixel, slab-tested
/// against every bounding volume.
pub fn survey(scene: &Scene) -> BvReport {
    let (rx, ry) = scene.res;
    let cam = &scene.camera;

    let mut rep = BvReport {
        volumes: scene.volumes.len(),
        min_tris: u32::MAX,
        ..Default::default()
    };
    for bv in &scene.volumes {
        rep.min_tris = rep.min_tris.min(bv.ntris);
        rep.max_tris = rep.max_tris.max(bv.ntris);
        rep.total_tris += bv.ntris as u64;
    }

    for y in 0..ry {
        for x in 0..rx {
            let px = ((x as f32 + 0.5) / rx as f32 - 0.5) * cam.width;
            let py = (0.5 - (y as f32 + 0.5) / ry as f32) * cam.height;
            let dir = (cam.u * px + cam.v * py - cam.w * cam.focal_len).normalize();
            let inv_dir = dir.recip();

            let mut hits = 0u32;
            for bv in &scene.volumes {
                if bv.bb.hit(cam.eye, inv_dir) {
                    hits += 1;
                }
            }

            rep.rays += 1;
            rep.total_hits += hits as u64;
            rep.max_hits = rep.max_hits.max(hits);
            if hits == 0 {
                rep.zero_hit_rays += 1;
            }
        }
    }
    rep
}
