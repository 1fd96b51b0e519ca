//! Math type re-exports and geometry helpers.
//!
//! Re-exports the `glam` types used across the crate and provides the
//! axis-aligned bounding box shared by the geometry tables and the BV
//! builder.

// Re-export glam types
pub use glam::{Mat3, Vec2, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty bounding box (inverted, expands on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Grow to include a point.
    #[inline]
    pub fn grow_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow to include another AABB.
    #[inline]
    pub fn grow(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Index of the longest side (0=x, 1=y, 2=z).
    #[inline]
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Slab test against a ray starting at `origin` with direction
    /// reciprocal `inv_dir`. Returns true if the ray hits the box at any
    /// non-negative distance.
    pub fn hit(&self, origin: Vec3, inv_dir: Vec3) -> bool {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let t1 = (self.min[axis] - origin[axis]) * inv_dir[axis];
            let t2 = (self.max[axis] - origin[axis]) * inv_dir[axis];
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_max < t_min {
                return false;
            }
        }
        true
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_identity_under_grow() {
        let mut b = Aabb::EMPTY;
        b.grow_point(Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(b.min, Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(b.max, Vec3::new(1.0, -2.0, 3.0));

        let mut c = Aabb::EMPTY;
        c.grow(&b);
        assert_eq!(c, b);
    }

    #[test]
    fn test_center_and_longest_axis() {
        let mut b = Aabb::EMPTY;
        b.grow_point(Vec3::ZERO);
        b.grow_point(Vec3::new(4.0, 2.0, 1.0));
        assert_eq!(b.center(), Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(b.longest_axis(), 0);

        let mut c = Aabb::EMPTY;
        c.grow_point(Vec3::ZERO);
        c.grow_point(Vec3::new(1.0, 1.0, 5.0));
        assert_eq!(c.longest_axis(), 2);
    }

    #[test]
    fn test_ray_hit() {
        let b = Aabb {
            min: Vec3::new(-1.0, -1.0, -1.0),
            max: Vec3::new(1.0, 1.0, 1.0),
        };
        let dir = Vec3::new(0.0, 0.0, -1.0);
        assert!(b.hit(Vec3::new(0.0, 0.0, 5.0), dir.recip()));
        assert!(!b.hit(Vec3::new(3.0, 0.0, 5.0), dir.recip()));
        // behind the origin
        assert!(!b.hit(Vec3::new(0.0, 0.0, -5.0), dir.recip()));
    }
}
