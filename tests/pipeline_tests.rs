//! End-to-end tests: scene files and OBJ models through assembly, BV
//! construction and serialization.

use std::io::Write;
use std::path::{Path, PathBuf};

use raypack::scene::Scene;
use raypack::serial::{swap_words, Layout, SCENE_MAGIC};
use raypack::util::Error;

/// Fixed header words: magic, resX, resY, |L|, |BV|.
const HEADER_FIXED: usize = 5;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).expect("create test file");
    f.write_all(contents.as_bytes()).expect("write test file");
    path
}

/// Minimal scene text listing the given OBJ file names.
fn scene_text(objs: &[&str], res: (u32, u32)) -> String {
    format!(
        "scene\nres {} {}\n\n\
         camera\neye 0 0 5\nuvw 1 0 0 0 1 0 0 0 1\nfocal_len 2\nproj_size 1 1\n\n\
         light\npos 1 1 1\nrgb 1 1 1\n\n\
         obj\n{}\n",
        res.0,
        res.1,
        objs.join("\n")
    )
}

/// `n` unit triangles at x-centers 0..n, all with explicit normals.
fn row_of_triangles(n: usize) -> String {
    let mut obj = String::from("vn 0 0 1\n");
    for i in 0..n {
        let x = i as f32;
        obj.push_str(&format!(
            "v {} -0.25 0\nv {} -0.25 0\nv {} 0.25 0\n",
            x - 0.25,
            x + 0.25,
            x
        ));
        let b = 3 * i + 1;
        obj.push_str(&format!("f {}//1 {}//1 {}//1\n", b, b + 1, b + 2));
    }
    obj
}

fn load(dir: &Path, objs: &[&str], res: (u32, u32), max_bv: u32, layout: Layout) -> Scene {
    let scpath = write_file(dir, "test.scene", &scene_text(objs, res));
    Scene::load(&scpath, max_bv, layout).expect("scene should load")
}

#[test]
fn single_triangle_scene() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "tri.obj",
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
    );

    let scene = load(dir.path(), &["tri.obj"], (2, 2), 1, Layout::Indexed);
    assert_eq!(scene.volumes.len(), 1);
    assert_eq!(scene.volumes[0].ntris, 1);
    assert_eq!(scene.tris.len(), 1);
    // no MTL: the default material was appended during repair
    assert_eq!(scene.materials.len(), 1);

    let words = scene.to_words();
    assert_eq!(words[0], SCENE_MAGIC);
    assert_eq!(words[0], 0x5343454E);
    assert_eq!(words.len(), scene.serialized_word_count());
}

#[cfg(not(feature = "textures"))]
#[test]
fn indexed_word_count_formula() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "row.obj", &row_of_triangles(5));

    let scene = load(dir.path(), &["row.obj"], (8, 8), 4, Layout::Indexed);
    let nf = scene.tris.len();
    let expect = HEADER_FIXED
        + 9 // offset table
        + 15 // camera
        + 7 * scene.volumes.len()
        + 3 * scene.verts.len()
        + 3 * scene.normals.len()
        + 3 * nf // vertex index triples
        + 3 * nf // normal index triples
        + nf // material ids
        + 13 * scene.materials.len()
        + 6 * scene.lights.len();
    assert_eq!(scene.serialized_word_count(), expect);
}

#[cfg(not(feature = "textures"))]
#[test]
fn duplicated_word_count_formula() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "row.obj", &row_of_triangles(5));

    let scene = load(dir.path(), &["row.obj"], (8, 8), 4, Layout::Duplicated);
    let nf = scene.tris.len();
    let expect = HEADER_FIXED
        + 6 // offset table
        + 15 // camera
        + 7 * scene.volumes.len()
        + 9 * nf // three vertices per triangle
        + 9 * nf // three normals per triangle
        + 13 * nf // one material per triangle
        + 6 * scene.lights.len();
    assert_eq!(scene.serialized_word_count(), expect);
}

#[test]
fn oversized_cap_reduces_stop_depth() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "row.obj", &row_of_triangles(8));

    // 8 triangles under max_bv = 16: stop depth drops to 2, four leaves
    let scene = load(dir.path(), &["row.obj"], (2, 2), 16, Layout::Duplicated);
    assert_eq!(scene.volumes.len(), 4);
    assert_eq!(
        scene.volumes.iter().map(|bv| bv.ntris).sum::<u32>(),
        scene.tris.len() as u32
    );
}

#[test]
fn missing_normals_are_synthesized() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "flat.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

    let scene = load(dir.path(), &["flat.obj"], (2, 2), 1, Layout::Indexed);
    // one synthesized flat normal, fanned to all three slots
    assert_eq!(scene.normals.len(), 1);
    assert_eq!(scene.tris[0].n, [0, 0, 0]);
    let n = scene.normals[0];
    assert!((n - glam::Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
}

#[test]
fn repaired_indices_are_all_in_range() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "lit.obj",
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
    );
    write_file(dir.path(), "flat.obj", "v 0 0 1\nv 1 0 1\nv 0 1 1\nf 1 2 3\n");

    let scene = load(
        dir.path(),
        &["lit.obj", "flat.obj"],
        (2, 2),
        1,
        Layout::Indexed,
    );
    for t in &scene.tris {
        for &v in &t.v {
            assert!(v >= 0 && (v as usize) < scene.verts.len());
        }
        for &n in &t.n {
            assert!(n >= 0 && (n as usize) < scene.normals.len());
        }
        assert!(t.mat >= 0 && (t.mat as usize) < scene.materials.len());
    }
}

#[cfg(not(feature = "textures"))]
#[test]
fn vertex_serializes_as_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "fx.obj",
        "v 1.5 -0.25 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
    );

    let scene = load(dir.path(), &["fx.obj"], (2, 2), 1, Layout::Indexed);
    let words = scene.to_words();
    // V section offset is the third entry of the offset table
    let v_off = words[HEADER_FIXED + 2] as usize;
    assert_eq!(words[v_off], 0x00018000);
    assert_eq!(words[v_off + 1], 0xFFFFC000);
    assert_eq!(words[v_off + 2], 0x00000000);
}

#[test]
fn eswap_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "tri.obj",
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n",
    );

    let scene = load(dir.path(), &["tri.obj"], (2, 2), 1, Layout::Duplicated);
    let plain = scene.to_words();
    let mut swapped = plain.clone();
    swap_words(&mut swapped);

    assert_eq!(swapped[0], 0x4E454353);
    for (a, b) in plain.iter().zip(&swapped) {
        assert_eq!(a.swap_bytes(), *b);
    }
    swap_words(&mut swapped);
    assert_eq!(plain, swapped);
}

#[test]
fn median_split_partitions_along_x() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "row.obj", &row_of_triangles(4));

    let scene = load(dir.path(), &["row.obj"], (2, 2), 2, Layout::Duplicated);
    assert_eq!(scene.volumes.len(), 2);
    assert_eq!(scene.volumes[0].ntris, 2);
    assert_eq!(scene.volumes[1].ntris, 2);

    // triangles reordered by x center: 0, 1 | 2, 3
    let centers: Vec<f32> = scene.tris.iter().map(|t| t.bb.center().x).collect();
    assert_eq!(centers, vec![0.0, 1.0, 2.0, 3.0]);
    assert!(scene.volumes[0].bb.max.x < scene.volumes[1].bb.min.x + 1.0);

    // each leaf's triangles stay inside its box
    let mut start = 0;
    for bv in &scene.volumes {
        for t in &scene.tris[start..start + bv.ntris as usize] {
            assert!(t.bb.min.cmpge(bv.bb.min).all());
            assert!(t.bb.max.cmple(bv.bb.max).all());
        }
        start += bv.ntris as usize;
    }
}

#[test]
fn multiple_objs_merge() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.obj", &row_of_triangles(2));
    write_file(dir.path(), "b.obj", &row_of_triangles(3));

    let scene = load(dir.path(), &["a.obj", "b.obj"], (2, 2), 2, Layout::Indexed);
    assert_eq!(scene.tris.len(), 5);
    assert_eq!(scene.verts.len(), 15);
    assert_eq!(scene.normals.len(), 2);
}

#[test]
fn empty_obj_list_fails() {
    let dir = tempfile::tempdir().unwrap();
    let text = scene_text(&[], (2, 2));
    let scpath = write_file(dir.path(), "empty.scene", &text);
    let err = Scene::load(&scpath, 1, Layout::Indexed).unwrap_err();
    assert!(matches!(err, Error::SceneFile { .. }));
}

#[test]
fn non_pow2_max_bv_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "row.obj", &row_of_triangles(4));
    let scpath = write_file(dir.path(), "t.scene", &scene_text(&["row.obj"], (2, 2)));
    let err = Scene::load(&scpath, 96, Layout::Indexed).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn mtl_materials_flow_through() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "two.mtl",
        "newmtl red\nKa 1 0 0\nKd 0.8 0 0\nKs 0.5 0.5 0.5\nNs 250\n\
         newmtl blue\nKd 0 0 0.8\nNs 1000\n",
    );
    write_file(
        dir.path(),
        "two.obj",
        "mtllib two.mtl\n\
         o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nusemtl red\nf 1//1 2//1 3//1\n\
         o b\nv 0 0 1\nv 1 0 1\nv 0 1 1\nusemtl blue\nf 4//1 5//1 6//1\n",
    );

    let scene = load(dir.path(), &["two.obj"], (2, 2), 1, Layout::Indexed);
    assert_eq!(scene.materials.len(), 2);
    assert_eq!(scene.tris.len(), 2);

    // both materials referenced, whatever order the BV sort left the faces in
    let mut mats: Vec<i32> = scene.tris.iter().map(|t| t.mat).collect();
    mats.sort();
    assert_eq!(mats, vec![0, 1]);

    // red: kd from the MTL, km = sqrt(250/1000) = 0.5
    let red = &scene.materials[0];
    assert!((red.kd.x - 0.8).abs() < 1e-6);
    assert_eq!(red.kd.y, 0.0);
    assert!((red.km.x - 0.5).abs() < 1e-6);

    // blue: Ns 1000 saturates the mirror coefficient
    let blue = &scene.materials[1];
    assert!((blue.km.x - 1.0).abs() < 1e-6);
}

#[cfg(not(feature = "textures"))]
#[test]
fn layouts_agree_on_resolved_attributes() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "row.obj", &row_of_triangles(6));

    let idx = load(dir.path(), &["row.obj"], (4, 4), 2, Layout::Indexed);
    let dup = load(dir.path(), &["row.obj"], (4, 4), 2, Layout::Duplicated);
    let wi = idx.to_words();
    let wd = dup.to_words();
    let nf = idx.tris.len();

    // indexed sections: camera(0) bv(1) V(2) NV(3) Vidx(4) NVidx(5) matid(6) M(7) L(8)
    let v_off = wi[HEADER_FIXED + 2] as usize;
    let n_off = wi[HEADER_FIXED + 3] as usize;
    let vidx_off = wi[HEADER_FIXED + 4] as usize;
    let nidx_off = wi[HEADER_FIXED + 5] as usize;
    let mid_off = wi[HEADER_FIXED + 6] as usize;
    let m_off = wi[HEADER_FIXED + 7] as usize;
    let l_off = wi[HEADER_FIXED + 8] as usize;

    // duplicated sections: camera(0) bv(1) triV(2) triNV(3) triM(4) L(5)
    let dv_off = wd[HEADER_FIXED + 2] as usize;
    let dn_off = wd[HEADER_FIXED + 3] as usize;
    let dm_off = wd[HEADER_FIXED + 4] as usize;
    let dl_off = wd[HEADER_FIXED + 5] as usize;

    for k in 0..nf {
        for c in 0..3 {
            let vi = wi[vidx_off + 3 * k + c] as usize;
            let ni = wi[nidx_off + 3 * k + c] as usize;
            for comp in 0..3 {
                assert_eq!(wi[v_off + 3 * vi + comp], wd[dv_off + 9 * k + 3 * c + comp]);
                assert_eq!(wi[n_off + 3 * ni + comp], wd[dn_off + 9 * k + 3 * c + comp]);
            }
        }
        let mi = wi[mid_off + k] as usize;
        for comp in 0..13 {
            assert_eq!(wi[m_off + 13 * mi + comp], wd[dm_off + 13 * k + comp]);
        }
    }

    // light sections are identical in both layouts
    assert_eq!(wi[l_off..l_off + 6], wd[dl_off..dl_off + 6]);
}

#[test]
fn missing_obj_file_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let scpath = write_file(dir.path(), "t.scene", &scene_text(&["gone.obj"], (2, 2)));
    let err = Scene::load(&scpath, 1, Layout::Indexed).unwrap_err();
    match err {
        Error::Obj { path, .. } => assert!(path.ends_with("gone.obj")),
        other => panic!("expected obj error, got {other:?}"),
    }
}
