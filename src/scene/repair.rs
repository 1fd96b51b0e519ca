//! Repair of faces missing normals, materials, or texture coordinates.
//!
//! Runs once after all models are merged. Missing materials share a single
//! appended fallback; missing texcoords share a single appended (0,0);
//! missing normals get one flat-shading normal per triangle. Pools are
//! addressed by integer index throughout, since the pass appends to them
//! while it walks the flagged faces.

use log::debug;

use super::types::Material;
use super::wavefront::Merged;

/// Fix every face queued in `bad_faces`, leaving all indices non-negative.
pub fn repair_faces(geo: &mut Merged) {
    let bad_faces = std::mem::take(&mut geo.bad_faces);
    if bad_faces.is_empty() {
        return;
    }

    let default_mat = bad_faces
        .iter()
        .any(|&f| geo.tris[f].mat < 0)
        .then(|| {
            geo.materials.push(Material::GRAY_PLASTIC);
            geo.materials.len() as i32 - 1
        });

    #[cfg(feature = "textures")]
    let default_uv = bad_faces
        .iter()
        .any(|&f| geo.tris[f].uv[0] < 0)
        .then(|| {
            geo.texcoords.push(crate::util::math::Vec2::ZERO);
            geo.texcoords.len() as i32 - 1
        });

    let mut fixed_normals = 0usize;
    for &f in &bad_faces {
        if geo.tris[f].mat < 0 {
            if let Some(id) = default_mat {
                geo.tris[f].mat = id;
            }
        }

        #[cfg(feature = "textures")]
        if geo.tris[f].uv[0] < 0 {
            if let Some(id) = default_uv {
                geo.tris[f].uv = [id; 3];
            }
        }

        if geo.tris[f].n[0] < 0 {
            // flat shading; smoothing groups would be nicer but the
            // renderer only needs a valid normal per vertex slot
            let [v0, v1, v2] = geo.tris[f].v.map(|i| geo.verts[i as usize]);
            let nv = (v1 - v0).cross(v2 - v0).normalize();
            geo.normals.push(nv);
            geo.tris[f].n = [geo.normals.len() as i32 - 1; 3];
            fixed_normals += 1;
        }
    }

    debug!(
        "repaired {} face(s), {} flat normal(s) synthesized",
        bad_faces.len(),
        fixed_normals
    );
}
