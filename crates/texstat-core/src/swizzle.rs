//! Channel swizzles
//!
//! A [`Swizzle`] selects, for each output channel, a source channel or a
//! constant. Textures commonly store luminance in red only (`"rrr1"`) or use
//! BGRA byte order (`"bgra"`); the statistics must be computed on the
//! channels the encoder will actually see.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::float4::Float4;

/// Where one output channel takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwizzleSource {
    R,
    G,
    B,
    A,
    /// Constant 0.0
    Zero,
    /// Constant 1.0
    One,
}

impl SwizzleSource {
    /// Resolve against a decoded texel.
    #[inline]
    pub fn select(self, t: Float4) -> f32 {
        match self {
            SwizzleSource::R => t.r,
            SwizzleSource::G => t.g,
            SwizzleSource::B => t.b,
            SwizzleSource::A => t.a,
            SwizzleSource::Zero => 0.0,
            SwizzleSource::One => 1.0,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'r' => Some(SwizzleSource::R),
            'g' => Some(SwizzleSource::G),
            'b' => Some(SwizzleSource::B),
            'a' => Some(SwizzleSource::A),
            '0' => Some(SwizzleSource::Zero),
            '1' => Some(SwizzleSource::One),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            SwizzleSource::R => 'r',
            SwizzleSource::G => 'g',
            SwizzleSource::B => 'b',
            SwizzleSource::A => 'a',
            SwizzleSource::Zero => '0',
            SwizzleSource::One => '1',
        }
    }
}

/// Output channel to source mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swizzle {
    pub r: SwizzleSource,
    pub g: SwizzleSource,
    pub b: SwizzleSource,
    pub a: SwizzleSource,
}

impl Default for Swizzle {
    fn default() -> Self {
        Swizzle::IDENTITY
    }
}

impl Swizzle {
    /// `rgba`
    pub const IDENTITY: Swizzle = Swizzle::new(
        SwizzleSource::R,
        SwizzleSource::G,
        SwizzleSource::B,
        SwizzleSource::A,
    );

    pub const fn new(
        r: SwizzleSource,
        g: SwizzleSource,
        b: SwizzleSource,
        a: SwizzleSource,
    ) -> Self {
        Swizzle { r, g, b, a }
    }

    /// True for `rgba`; callers skip the remap entirely in that case.
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Swizzle::IDENTITY
    }

    /// Remap a decoded texel.
    #[inline]
    pub fn apply(&self, t: Float4) -> Float4 {
        Float4::new(
            self.r.select(t),
            self.g.select(t),
            self.b.select(t),
            self.a.select(t),
        )
    }

    /// Sources in output channel order.
    pub fn sources(&self) -> [SwizzleSource; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Exchange the sources of output channels `i` and `j` (0 = R .. 3 = A).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if either index is above 3.
    pub fn swapped(&self, i: usize, j: usize) -> Result<Swizzle> {
        if i > 3 || j > 3 {
            return Err(Error::InvalidParameter(format!(
                "channel index out of range: {i}, {j}"
            )));
        }
        let mut s = self.sources();
        s.swap(i, j);
        Ok(Swizzle::new(s[0], s[1], s[2], s[3]))
    }
}

impl FromStr for Swizzle {
    type Err = Error;

    /// Parse four characters from `rgba01`, case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        let parsed: Vec<SwizzleSource> = s
            .chars()
            .map(|c| {
                SwizzleSource::from_char(c).ok_or_else(|| {
                    Error::InvalidParameter(format!("invalid swizzle character '{c}' in \"{s}\""))
                })
            })
            .collect::<Result<_>>()?;

        match parsed.as_slice() {
            [r, g, b, a] => Ok(Swizzle::new(*r, *g, *b, *a)),
            _ => Err(Error::InvalidParameter(format!(
                "swizzle must have 4 characters, got \"{s}\""
            ))),
        }
    }
}

impl fmt::Display for Swizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for src in self.sources() {
            write!(f, "{}", src.as_char())?;
        }
        Ok(())
    }
}
