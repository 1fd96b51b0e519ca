//! Core scene entities: camera, lights, materials, triangles.

use crate::util::math::{Aabb, Vec3};

/// Pinhole camera with an explicit orthonormal basis.
///
/// `-w` is the view direction; `u` and `v` span the projection plane,
/// which sits at `focal_len` world units from the eye and measures
/// `width` x `height` world units.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
    pub focal_len: f32,
    pub width: f32,
    pub height: f32,
}

/// Point light with an RGB color in [0,1] per channel.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub pos: Vec3,
    pub rgb: Vec3,
}

/// Phong-style material.
///
/// `km` is the mirror coefficient derived from MTL shininess (see the
/// wavefront adapter); `ns` is the raw shininess exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ka: Vec3,
    pub kd: Vec3,
    pub ks: Vec3,
    pub km: Vec3,
    pub ns: f32,
}

impl Material {
    /// Fallback for faces with no MTL material.
    pub const GRAY_PLASTIC: Self = Self {
        ka: Vec3::ONE,
        kd: Vec3::new(0.8, 0.8, 0.8),
        ks: Vec3::new(0.5, 0.5, 0.5),
        km: Vec3::new(0.05, 0.05, 0.05),
        ns: 250.0,
    };
}

/// A triangle: indices into the scene pools plus a cached bounding box.
///
/// Normal, texcoord and material indices are -1 until face repair runs;
/// afterwards every index is non-negative and in range.
#[derive(Debug, Clone)]
pub struct Tri {
    pub v: [i32; 3],
    pub n: [i32; 3],
    #[cfg(feature = "textures")]
    pub uv: [i32; 3],
    pub mat: i32,
    pub bb: Aabb,
}
