//! Scene assembly: declarative scene description plus OBJ geometry.
//!
//! [`Scene::load`] runs the whole pipeline: parse the `.scene` file, load
//! and merge the listed OBJ models, repair incomplete faces, then build
//! the bounding-volume table (which reorders the triangle array so each
//! volume owns a contiguous slice). The result is immutable.

mod parser;
mod repair;
mod types;
mod wavefront;

pub use types::{Camera, Light, Material, Tri};

use std::path::Path;

use log::{debug, info};

use crate::bvh::{self, Bv};
use crate::serial::Layout;
use crate::util::math::Vec3;
use crate::util::{Error, Result};

/// The root aggregate: camera, lights, geometry pools, materials,
/// triangles and bounding volumes.
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    /// Render resolution in pixels.
    pub res: (u32, u32),
    pub lights: Vec<Light>,
    pub verts: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    #[cfg(feature = "textures")]
    pub texcoords: Vec<crate::util::math::Vec2>,
    pub materials: Vec<Material>,
    pub tris: Vec<Tri>,
    pub volumes: Vec<Bv>,
    pub(crate) layout: Layout,
}

impl Scene {
    /// Load and assemble a scene from a `.scene` description.
    ///
    /// `max_bv` caps the bounding-volume count and must be a power of two;
    /// `layout` selects the serialization body written later.
    pub fn load(path: &Path, max_bv: u32, layout: Layout) -> Result<Self> {
        let desc = parser::parse_file(path)?;
        info!(
            "{}: {}x{} render, {} light(s), {} obj file(s)",
            path.display(),
            desc.res.0,
            desc.res.1,
            desc.lights.len(),
            desc.obj_paths.len()
        );

        let mut geo = wavefront::merge_models(&desc.obj_paths)?;
        repair::repair_faces(&mut geo);
        if geo.tris.is_empty() || geo.verts.is_empty() {
            return Err(Error::EmptyGeometry);
        }
        debug!(
            "merged geometry: {} verts, {} normals, {} materials, {} triangles",
            geo.verts.len(),
            geo.normals.len(),
            geo.materials.len(),
            geo.tris.len()
        );

        let volumes = bvh::build(&mut geo.tris, max_bv)?;

        Ok(Scene {
            camera: desc.camera,
            res: desc.res,
            lights: desc.lights,
            verts: geo.verts,
            normals: geo.normals,
            #[cfg(feature = "textures")]
            texcoords: geo.texcoords,
            materials: geo.materials,
            tris: geo.tris,
            volumes,
            layout,
        })
    }

    /// The serialization layout selected at load time.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}
