//! Small 2D math helpers used by the managers and demo screens.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// 2D vector in virtual-screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Angle from `self` to `other` in degrees
    pub fn angle_to(self, other: Vec2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Linear interpolation with `t` clamped to 0..=1
    pub fn lerp(self, end: Vec2, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        Vec2::new(lerp(self.x, end.x, t), lerp(self.y, end.y, t))
    }

    /// Rotate this point around `origin` by `degrees`
    pub fn rotate_around(self, origin: Vec2, degrees: f32) -> Vec2 {
        let (s, c) = degrees.to_radians().sin_cos();
        let p = self - origin;
        Vec2::new(p.x * c - p.y * s + origin.x, p.x * s + p.y * c + origin.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle in floating point virtual pixels
///
/// Kept separate from `sdl2::rect::Rect` so game logic stays testable
/// without SDL; `to_sdl` converts at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectf {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rectf {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rectf { x, y, w, h }
    }

    /// Rectangle of size `w`x`h` centered on `center`
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Rectf::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test; touching edges do not count
    pub fn overlaps(&self, other: &Rectf) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Inclusive point test
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn to_sdl(&self) -> sdl2::rect::Rect {
        sdl2::rect::Rect::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.w.max(0.0).round() as u32,
            self.h.max(0.0).round() as u32,
        )
    }
}

pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + t * (end - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_overlap_and_contains() {
        let a = Rectf::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectf::new(5.0, 5.0, 10.0, 10.0);
        let c = Rectf::new(10.0, 0.0, 5.0, 5.0);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c), "touching edges should not overlap");
        assert!(a.contains(Vec2::new(10.0, 10.0)));
        assert!(!a.contains(Vec2::new(10.1, 5.0)));
    }

    #[test]
    fn test_rotate_around() {
        let p = Vec2::new(1.0, 0.0).rotate_around(Vec2::ZERO, 90.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_lerp_clamps() {
        let v = Vec2::ZERO.lerp(Vec2::new(10.0, 10.0), 2.0);
        assert_eq!(v, Vec2::new(10.0, 10.0));
    }
}
