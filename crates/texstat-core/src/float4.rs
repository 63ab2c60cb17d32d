//! Float4 - four-lane RGBA accumulator
//!
//! All sampling, summed-area-table and statistics arithmetic runs on this
//! type. Operators are component-wise.

use std::ops::{Add, AddAssign, Index, Mul, Sub};

/// Four `f32` lanes in R, G, B, A order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Float4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Float4 {
    /// All lanes zero.
    pub const ZERO: Float4 = Float4::splat(0.0);

    /// All lanes one.
    pub const ONE: Float4 = Float4::splat(1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Float4 { r, g, b, a }
    }

    /// Broadcast one value to every lane.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Float4 {
            r: v,
            g: v,
            b: v,
            a: v,
        }
    }

    /// Lanes as an array.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Largest absolute lane difference between `self` and `other`.
    pub fn max_abs_diff(self, other: Float4) -> f32 {
        let d = self - other;
        d.r.abs().max(d.g.abs()).max(d.b.abs()).max(d.a.abs())
    }
}

impl From<[f32; 4]> for Float4 {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        Float4::new(v[0], v[1], v[2], v[3])
    }
}

impl Index<usize> for Float4 {
    type Output = f32;

    #[inline]
    fn index(&self, lane: usize) -> &f32 {
        match lane {
            0 => &self.r,
            1 => &self.g,
            2 => &self.b,
            3 => &self.a,
            _ => panic!("Float4 lane {lane} out of range"),
        }
    }
}

impl Add for Float4 {
    type Output = Float4;

    #[inline]
    fn add(self, o: Float4) -> Float4 {
        Float4::new(self.r + o.r, self.g + o.g, self.b + o.b, self.a + o.a)
    }
}

impl AddAssign for Float4 {
    #[inline]
    fn add_assign(&mut self, o: Float4) {
        *self = *self + o;
    }
}

impl Sub for Float4 {
    type Output = Float4;

    #[inline]
    fn sub(self, o: Float4) -> Float4 {
        Float4::new(self.r - o.r, self.g - o.g, self.b - o.b, self.a - o.a)
    }
}

impl Mul for Float4 {
    type Output = Float4;

    #[inline]
    fn mul(self, o: Float4) -> Float4 {
        Float4::new(self.r * o.r, self.g * o.g, self.b * o.b, self.a * o.a)
    }
}

impl Mul<f32> for Float4 {
    type Output = Float4;

    #[inline]
    fn mul(self, s: f32) -> Float4 {
        Float4::new(self.r * s, self.g * s, self.b * s, self.a * s)
    }
}

impl Mul<Float4> for f32 {
    type Output = Float4;

    #[inline]
    fn mul(self, v: Float4) -> Float4 {
        v * self
    }
}
