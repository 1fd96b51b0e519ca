//! Binary serialization of a scene into 32-bit words.
//!
//! The output is a flat buffer of words: a fixed header (magic,
//! resolution, light and BV counts), a per-layout table of section
//! offsets, then the body sections. Floats are Q15.16 fixed-point words;
//! index triples are written verbatim.
//!
//! Two body layouts exist. [`Layout::Indexed`] shares the vertex, normal
//! and material pools and writes per-triangle index triples;
//! [`Layout::Duplicated`] inlines every triangle's resolved vertices,
//! normals and material, so the renderer never chases an index.
//!
//! # Buffer structure
//!
//! ```text
//! word 0        magic 0x5343454E ("SCEN")
//! word 1..2     resX, resY
//! word 3        light count
//! word 4        bounding-volume count
//! word 5..      section offset table (one word per body section)
//! ...           body sections, back to back
//! ```
//!
//! Offsets are 32-bit word offsets from the start of the buffer, in the
//! same order as the body sections:
//!
//! | layout     | sections                                              |
//! |------------|-------------------------------------------------------|
//! | Indexed    | camera, BV, V, NV, Vidx, NVidx, matid, M, L (, UV, UVidx) |
//! | Duplicated | camera, BV, tri V, tri NV, tri M, L (, tri UV)        |
//!
//! Entity encodings: vec3 = 3 fixed-point words; bbox = min + max; bv =
//! bbox + count; material = ka kd ks km + fixed(ns); light = pos + rgb;
//! camera = eye u v w + fixed(focal_len, width, height).

mod cheader;

pub use cheader::write_c_header;

use crate::bvh::Bv;
use crate::scene::{Camera, Light, Material, Scene};
use crate::util::fixed::to_fixed;
use crate::util::math::{Aabb, Vec3};

/// Magic number in word 0: "SCEN".
pub const SCENE_MAGIC: u32 = 0x5343_454E;

/// Words in the fixed part of the header (magic, resX, resY, |L|, |BV|).
const HEADER_FIXED_WORDS: usize = 5;

const CAMERA_WORDS: usize = 15;
const BV_WORDS: usize = 7;
const MATERIAL_WORDS: usize = 13;
const LIGHT_WORDS: usize = 6;

/// Serialization layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Inline each triangle's vertices, normals and material.
    #[default]
    Duplicated,
    /// Shared pools plus per-triangle index triples.
    Indexed,
}

/// Byteswap every word in place (the endianness-swap output pass).
pub fn swap_words(buf: &mut [u32]) {
    for w in buf.iter_mut() {
        *w = w.swap_bytes();
    }
}

/// Encode the word buffer as little-endian bytes for file or socket
/// output. After a [`swap_words`] pass this yields a big-endian file.
pub fn words_to_le_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for &w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes
}

struct WordWriter<'a> {
    buf: &'a mut [u32],
    pos: usize,
}

impl WordWriter<'_> {
    #[inline]
    fn put(&mut self, w: u32) {
        self.buf[self.pos] = w;
        self.pos += 1;
    }

    #[inline]
    fn put_i32(&mut self, v: i32) {
        self.put(v as u32);
    }

    #[inline]
    fn put_f32(&mut self, v: f32) {
        self.put(to_fixed(v));
    }

    fn put_vec3(&mut self, v: Vec3) {
        self.put_f32(v.x);
        self.put_f32(v.y);
        self.put_f32(v.z);
    }

    fn put_aabb(&mut self, bb: &Aabb) {
        self.put_vec3(bb.min);
        self.put_vec3(bb.max);
    }

    fn put_bv(&mut self, bv: &Bv) {
        self.put_aabb(&bv.bb);
        self.put(bv.ntris);
    }

    fn put_material(&mut self, m: &Material) {
        self.put_vec3(m.ka);
        self.put_vec3(m.kd);
        self.put_vec3(m.ks);
        self.put_vec3(m.km);
        self.put_f32(m.ns);
    }

    fn put_light(&mut self, l: &Light) {
        self.put_vec3(l.pos);
        self.put_vec3(l.rgb);
    }

    fn put_camera(&mut self, c: &Camera) {
        self.put_vec3(c.eye);
        self.put_vec3(c.u);
        self.put_vec3(c.v);
        self.put_vec3(c.w);
        self.put_f32(c.focal_len);
        self.put_f32(c.width);
        self.put_f32(c.height);
    }
}

impl Scene {
    /// Per-layout body section sizes, in words, in on-disk order. The
    /// header carries one offset per entry, so the offset table and the
    /// total size both derive from this single list.
    fn section_words(&self) -> Vec<usize> {
        let nf = self.tris.len();
        match self.layout {
            Layout::Indexed => {
                #[allow(unused_mut)]
                let mut s = vec![
                    CAMERA_WORDS,
                    BV_WORDS * self.volumes.len(),
                    3 * self.verts.len(),
                    3 * self.normals.len(),
                    3 * nf, // vertex index triples
                    3 * nf, // normal index triples
                    nf,     // material ids
                    MATERIAL_WORDS * self.materials.len(),
                    LIGHT_WORDS * self.lights.len(),
                ];
                #[cfg(feature = "textures")]
                {
                    s.push(2 * self.texcoords.len());
                    s.push(3 * nf); // texcoord index triples
                }
                s
            }
            Layout::Duplicated => {
                #[allow(unused_mut)]
                let mut s = vec![
                    CAMERA_WORDS,
                    BV_WORDS * self.volumes.len(),
                    9 * nf, // three vertices per triangle
                    9 * nf, // three normals per triangle
                    MATERIAL_WORDS * nf,
                    LIGHT_WORDS * self.lights.len(),
                ];
                #[cfg(feature = "textures")]
                s.push(6 * nf); // three texcoords per triangle
                s
            }
        }
    }

    /// Exact size of the serialized scene, in 32-bit words.
    pub fn serialized_word_count(&self) -> usize {
        let sections = self.section_words();
        HEADER_FIXED_WORDS + sections.len() + sections.iter().sum::<usize>()
    }

    /// Serialize into `buf`, which must hold exactly
    /// [`serialized_word_count`](Self::serialized_word_count) words.
    pub fn serialize(&self, buf: &mut [u32]) {
        let sections = self.section_words();
        let total = HEADER_FIXED_WORDS + sections.len() + sections.iter().sum::<usize>();
        assert_eq!(buf.len(), total, "buffer size does not match word count");

        let mut w = WordWriter { buf, pos: 0 };
        w.put(SCENE_MAGIC);
        w.put(self.res.0);
        w.put(self.res.1);
        w.put(self.lights.len() as u32);
        w.put(self.volumes.len() as u32);

        let mut off = HEADER_FIXED_WORDS + sections.len();
        for &size in &sections {
            w.put(off as u32);
            off += size;
        }

        match self.layout {
            Layout::Indexed => self.write_indexed(&mut w),
            Layout::Duplicated => self.write_duplicated(&mut w),
        }
        assert_eq!(w.pos, total, "serializer drifted from its size formula");
    }

    /// Serialize into a freshly allocated buffer.
    pub fn to_words(&self) -> Vec<u32> {
        let mut buf = vec![0u32; self.serialized_word_count()];
        self.serialize(&mut buf);
        buf
    }

    fn write_indexed(&self, w: &mut WordWriter) {
        w.put_camera(&self.camera);
        for bv in &self.volumes {
            w.put_bv(bv);
        }
        for v in &self.verts {
            w.put_vec3(*v);
        }
        for n in &self.normals {
            w.put_vec3(*n);
        }
        for t in &self.tris {
            for i in t.v {
                w.put_i32(i);
            }
        }
        for t in &self.tris {
            for i in t.n {
                w.put_i32(i);
            }
        }
        for t in &self.tris {
            w.put_i32(t.mat);
        }
        for m in &self.materials {
            w.put_material(m);
        }
        for l in &self.lights {
            w.put_light(l);
        }
        #[cfg(feature = "textures")]
        {
            for uv in &self.texcoords {
                w.put_f32(uv.x);
                w.put_f32(uv.y);
            }
            for t in &self.tris {
                for i in t.uv {
                    w.put_i32(i);
                }
            }
        }
    }

    fn write_duplicated(&self, w: &mut WordWriter) {
        w.put_camera(&self.camera);
        for bv in &self.volumes {
            w.put_bv(bv);
        }
        for t in &self.tris {
            for i in t.v {
                w.put_vec3(self.verts[i as usize]);
            }
        }
        for t in &self.tris {
            for i in t.n {
                w.put_vec3(self.normals[i as usize]);
            }
        }
        for t in &self.tris {
            w.put_material(&self.materials[t.mat as usize]);
        }
        for l in &self.lights {
            w.put_light(l);
        }
        #[cfg(feature = "textures")]
        for t in &self.tris {
            for i in t.uv {
                let uv = self.texcoords[i as usize];
                w.put_f32(uv.x);
                w.put_f32(uv.y);
            }
        }
    }
}
