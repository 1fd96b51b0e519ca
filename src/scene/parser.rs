//! Declarative scene-file parser.
//!
//! A scene file is a sequence of sections: a keyword line (`scene`,
//! `camera`, `light`, `obj`) followed by property lines, terminated by a
//! blank line. Sections may appear in any order; `light` and `obj` may
//! repeat and accumulate. Duplicate properties within a section are
//! tolerated, the last value wins.

use std::path::{Path, PathBuf};

use crate::util::math::{Mat3, Vec3};
use crate::util::{Error, Result};

use super::types::{Camera, Light};

/// Parsed scene description, before any geometry is loaded.
#[derive(Debug)]
pub struct SceneDesc {
    pub res: (u32, u32),
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub obj_paths: Vec<PathBuf>,
}

/// Read and parse a scene file. OBJ paths resolve relative to the scene
/// file's directory.
pub fn parse_file(path: &Path) -> Result<SceneDesc> {
    // scene files are small, read the whole thing
    let text = std::fs::read_to_string(path)?;
    parse_str(&text, path)
}

fn parse_str(text: &str, path: &Path) -> Result<SceneDesc> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    let mut res = None;
    let mut camera = None;
    let mut lights = Vec::new();
    let mut obj_paths = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let head = lines[i];
        let headno = i + 1;
        i += 1;
        if head.is_empty() {
            continue;
        }
        match head {
            "scene" => res = Some(parse_scene(path, &lines, &mut i)?),
            "camera" => camera = Some(parse_camera(path, &lines, &mut i)?),
            "light" => lights.push(parse_light(path, &lines, &mut i)?),
            "obj" => {
                while i < lines.len() && !lines[i].is_empty() {
                    obj_paths.push(dir.join(lines[i]));
                    i += 1;
                }
            }
            _ => return Err(Error::parse(path, headno, "unrecognized prop")),
        }
    }

    let missing = |msg: &str| Error::SceneFile {
        path: path.into(),
        msg: msg.into(),
    };
    let res = res.ok_or_else(|| missing("no resolution"))?;
    let camera = camera.ok_or_else(|| missing("no camera section"))?;
    if lights.is_empty() {
        return Err(missing("no lights"));
    }
    if obj_paths.is_empty() {
        return Err(missing("no obj files listed"));
    }

    Ok(SceneDesc {
        res,
        camera,
        lights,
        obj_paths,
    })
}

/// Next property line of the current section, with its 1-based line
/// number. Returns None at the section-ending blank line (consumed) or at
/// end of input.
fn next_prop<'a>(lines: &[&'a str], i: &mut usize) -> Option<(&'a str, usize)> {
    if *i >= lines.len() {
        return None;
    }
    let line = lines[*i];
    let lineno = *i + 1;
    *i += 1;
    if line.is_empty() {
        None
    } else {
        Some((line, lineno))
    }
}

/// Parse N whitespace-separated numbers; trailing tokens are ignored.
fn nums<T, const N: usize>(s: &str) -> Option<[T; N]>
where
    T: std::str::FromStr + Copy + Default,
{
    let mut it = s.split_ascii_whitespace();
    let mut out = [T::default(); N];
    for slot in &mut out {
        *slot = it.next()?.parse().ok()?;
    }
    Some(out)
}

fn parse_scene(path: &Path, lines: &[&str], i: &mut usize) -> Result<(u32, u32)> {
    let mut res = None;
    while let Some((line, lineno)) = next_prop(lines, i) {
        if let Some(rest) = line.strip_prefix("res ") {
            let [x, y] = nums::<u32, 2>(rest)
                .filter(|&[x, y]| x > 0 && y > 0)
                .ok_or_else(|| Error::parse(path, lineno, "invalid resolution"))?;
            res = Some((x, y));
        } else {
            return Err(Error::parse(path, lineno, "unrecognized prop"));
        }
    }
    res.ok_or_else(|| Error::parse(path, *i, "missing scene prop(s)"))
}

fn parse_camera(path: &Path, lines: &[&str], i: &mut usize) -> Result<Camera> {
    let mut eye = None;
    let mut uvw = None;
    let mut axis_angle = None;
    let mut focal_len = None;
    let mut proj = None;

    while let Some((line, lineno)) = next_prop(lines, i) {
        if let Some(rest) = line.strip_prefix("eye ") {
            let [x, y, z] =
                nums(rest).ok_or_else(|| Error::parse(path, lineno, "invalid eye"))?;
            eye = Some(Vec3::new(x, y, z));
        } else if let Some(rest) = line.strip_prefix("uvw ") {
            let [ux, uy, uz, vx, vy, vz, wx, wy, wz] =
                nums(rest).ok_or_else(|| Error::parse(path, lineno, "invalid uvw"))?;
            uvw = Some((
                Vec3::new(ux, uy, uz),
                Vec3::new(vx, vy, vz),
                Vec3::new(wx, wy, wz),
            ));
        } else if let Some(rest) = line.strip_prefix("axis_angle ") {
            let [ax, ay, az, deg] =
                nums(rest).ok_or_else(|| Error::parse(path, lineno, "invalid axis_angle"))?;
            let axis = Vec3::new(ax, ay, az);
            if axis == Vec3::ZERO {
                return Err(Error::parse(path, lineno, "invalid axis_angle"));
            }
            axis_angle = Some(basis_from_axis_angle(axis, deg));
        } else if let Some(rest) = line.strip_prefix("focal_len ") {
            let [f] = nums::<f32, 1>(rest)
                .filter(|&[f]| f > 0.0)
                .ok_or_else(|| Error::parse(path, lineno, "invalid focal length"))?;
            focal_len = Some(f);
        } else if let Some(rest) = line.strip_prefix("proj_size ") {
            let [w, h] = nums::<f32, 2>(rest)
                .filter(|&[w, h]| w > 0.0 && h > 0.0)
                .ok_or_else(|| Error::parse(path, lineno, "invalid projection size"))?;
            proj = Some((w, h));
        } else {
            return Err(Error::parse(path, lineno, "unrecognized prop"));
        }
    }

    // the orientation must come from exactly one of the two keywords
    if uvw.is_some() && axis_angle.is_some() {
        return Err(Error::parse(path, *i, "camera has both uvw and axis_angle"));
    }
    let basis = uvw.or(axis_angle);

    match (eye, basis, focal_len, proj) {
        (Some(eye), Some((u, v, w)), Some(focal_len), Some((width, height))) => Ok(Camera {
            eye,
            u,
            v,
            w,
            focal_len,
            width,
            height,
        }),
        _ => Err(Error::parse(path, *i, "missing camera prop(s)")),
    }
}

fn parse_light(path: &Path, lines: &[&str], i: &mut usize) -> Result<Light> {
    let mut pos = None;
    let mut rgb = None;

    while let Some((line, lineno)) = next_prop(lines, i) {
        if let Some(rest) = line.strip_prefix("pos ") {
            let [x, y, z] =
                nums(rest).ok_or_else(|| Error::parse(path, lineno, "invalid position"))?;
            pos = Some(Vec3::new(x, y, z));
        } else if let Some(rest) = line.strip_prefix("rgb ") {
            let [r, g, b] = nums::<f32, 3>(rest)
                .filter(|c| c.iter().all(|&x| (0.0..=1.0).contains(&x)))
                .ok_or_else(|| Error::parse(path, lineno, "invalid color, must be in [0,1]"))?;
            rgb = Some(Vec3::new(r, g, b));
        } else {
            return Err(Error::parse(path, lineno, "unrecognized prop"));
        }
    }

    match (pos, rgb) {
        (Some(pos), Some(rgb)) => Ok(Light { pos, rgb }),
        _ => Err(Error::parse(path, *i, "missing light prop(s)")),
    }
}

/// Expand an axis + angle (degrees) into the camera basis by rotating the
/// identity basis.
fn basis_from_axis_angle(axis: Vec3, deg: f32) -> (Vec3, Vec3, Vec3) {
    let m = Mat3::from_axis_angle(axis.normalize(), deg.to_radians());
    (m * Vec3::X, m * Vec3::Y, m * Vec3::Z)
}
