//! Hue value on the 8-bit color wheel used by addressable LED drivers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position on the 0-255 color wheel (0 = red, 96 = green, 160 = blue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hue(u8);

impl Hue {
    pub const RED: Hue = Hue(0);
    pub const GREEN: Hue = Hue(96);
    pub const BLUE: Hue = Hue(160);

    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Parse a hue from a decimal string, rejecting values outside 0-255
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<u8>().ok().map(Hue)
    }
}

impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Hue {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
