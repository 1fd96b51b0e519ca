//! Adapter from the external OBJ/MTL parser into the scene's flat tables.
//!
//! Every listed model is loaded with triangulation and appended to shared
//! vertex / normal / texcoord / material pools, remapping each index
//! stream by the pool's pre-append length. Faces whose normal, texcoord
//! or material references are absent are recorded with -1 indices and
//! queued for repair.

use std::path::{Path, PathBuf};

use log::debug;

use crate::util::math::{Aabb, Vec3};
use crate::util::{Error, Result};

use super::types::{Material, Tri};

/// Merged geometry pools plus the indices of faces needing repair.
#[derive(Debug, Default)]
pub struct Merged {
    pub verts: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    #[cfg(feature = "textures")]
    pub texcoords: Vec<crate::util::math::Vec2>,
    pub materials: Vec<Material>,
    pub tris: Vec<Tri>,
    pub bad_faces: Vec<usize>,
}

/// Load and merge all models into a single geometry table.
pub fn merge_models(paths: &[PathBuf]) -> Result<Merged> {
    let mut merged = Merged::default();
    for path in paths {
        load_into(path, &mut merged)?;
    }
    Ok(merged)
}

fn obj_err(path: &Path, msg: impl ToString) -> Error {
    Error::Obj {
        path: path.into(),
        msg: msg.to_string(),
    }
}

fn load_into(path: &Path, out: &mut Merged) -> Result<()> {
    // Keep separate index streams per attribute; lines and points are not
    // ignored, so their presence fails the load.
    let opts = tobj::LoadOptions {
        triangulate: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &opts).map_err(|e| obj_err(path, e))?;
    let materials = materials.map_err(|e| obj_err(path, e))?;

    let base_mat = out.materials.len() as i32;
    out.materials.extend(materials.iter().map(convert_material));

    for model in &models {
        let mesh = &model.mesh;

        let base_v = out.verts.len() as i32;
        for p in mesh.positions.chunks_exact(3) {
            out.verts.push(Vec3::new(p[0], p[1], p[2]));
        }

        let base_n = out.normals.len() as i32;
        for n in mesh.normals.chunks_exact(3) {
            out.normals.push(Vec3::new(n[0], n[1], n[2]));
        }

        #[cfg(feature = "textures")]
        let base_uv = out.texcoords.len() as i32;
        #[cfg(feature = "textures")]
        for t in mesh.texcoords.chunks_exact(2) {
            out.texcoords.push(crate::util::math::Vec2::new(t[0], t[1]));
        }

        // The parser emits whole per-mesh index streams: anything short of
        // one entry per face corner means the attribute is missing for
        // every face of this mesh.
        let has_normals = mesh.normal_indices.len() == mesh.indices.len();
        #[cfg(feature = "textures")]
        let has_uvs = mesh.texcoord_indices.len() == mesh.indices.len();
        let mat = match mesh.material_id {
            Some(id) => base_mat + id as i32,
            None => -1,
        };

        for (f, vi) in mesh.indices.chunks_exact(3).enumerate() {
            let v = [
                base_v + vi[0] as i32,
                base_v + vi[1] as i32,
                base_v + vi[2] as i32,
            ];

            let mut bad = mat < 0;
            let n = if has_normals {
                let ni = &mesh.normal_indices[3 * f..3 * f + 3];
                [
                    base_n + ni[0] as i32,
                    base_n + ni[1] as i32,
                    base_n + ni[2] as i32,
                ]
            } else {
                bad = true;
                [-1; 3]
            };

            #[cfg(feature = "textures")]
            let uv = if has_uvs {
                let ti = &mesh.texcoord_indices[3 * f..3 * f + 3];
                [
                    base_uv + ti[0] as i32,
                    base_uv + ti[1] as i32,
                    base_uv + ti[2] as i32,
                ]
            } else {
                bad = true;
                [-1; 3]
            };

            let mut bb = Aabb::EMPTY;
            for &idx in &v {
                bb.grow_point(out.verts[idx as usize]);
            }

            out.tris.push(Tri {
                v,
                n,
                #[cfg(feature = "textures")]
                uv,
                mat,
                bb,
            });
            if bad {
                out.bad_faces.push(out.tris.len() - 1);
            }
        }
    }

    debug!(
        "{}: {} model(s), {} material(s), {} triangles so far",
        path.display(),
        models.len(),
        materials.len(),
        out.tris.len()
    );
    Ok(())
}

/// Convert an MTL material. The mirror coefficient comes from shininess,
/// km = sqrt(clamp(ns/1000, 0, 1)) per channel, approximating Blender's
/// shininess-to-roughness curve with reflectance as its complement.
fn convert_material(m: &tobj::Material) -> Material {
    let ns = m.shininess.unwrap_or(0.0);
    let refl = (ns / 1000.0).clamp(0.0, 1.0).sqrt();
    Material {
        ka: m.ambient.map_or(Vec3::ONE, Vec3::from_array),
        kd: m.diffuse.map_or(Vec3::new(0.8, 0.8, 0.8), Vec3::from_array),
        ks: m.specular.map_or(Vec3::new(0.5, 0.5, 0.5), Vec3::from_array),
        km: Vec3::splat(refl),
        ns,
    }
}
