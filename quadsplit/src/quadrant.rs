//! Quadrant labels and the fixed four-slot container used for every
//! per-quadrant value (groups, summaries, child nodes).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

/// One of the four quadrants produced by a split.
///
/// The discriminant is a 2-bit code: bit 0 is set for the east half
/// (x at or beyond the reference center) and bit 1 for the south half
/// (y below the reference center).
///
/// ```text
///        |
///   NW   |   NE
///  (00)  |  (01)
/// -------+-------
///   SW   |   SE
///  (10)  |  (11)
///        |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in code order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    const EAST_BIT: u8 = 0b01;
    const SOUTH_BIT: u8 = 0b10;

    /// Returns the 2-bit code of this quadrant.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns the quadrant for a 2-bit code, or `None` for codes above 3.
    pub fn from_code(code: u8) -> Option<Quadrant> {
        match code {
            0 => Some(Quadrant::NorthWest),
            1 => Some(Quadrant::NorthEast),
            2 => Some(Quadrant::SouthWest),
            3 => Some(Quadrant::SouthEast),
            _ => None,
        }
    }

    /// Builds a quadrant from its two half-plane flags.
    pub fn from_halves(east: bool, south: bool) -> Quadrant {
        let mut code = 0;
        if east {
            code |= Self::EAST_BIT;
        }
        if south {
            code |= Self::SOUTH_BIT;
        }
        Quadrant::ALL[code as usize]
    }

    /// True for `NorthEast` and `SouthEast`.
    pub fn is_east(self) -> bool {
        self.code() & Self::EAST_BIT != 0
    }

    /// True for `SouthWest` and `SouthEast`.
    pub fn is_south(self) -> bool {
        self.code() & Self::SOUTH_BIT != 0
    }

    /// Position of this quadrant in [`Quadrant::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::NorthWest => "NW",
            Quadrant::NorthEast => "NE",
            Quadrant::SouthWest => "SW",
            Quadrant::SouthEast => "SE",
        };
        write!(f, "{}", name)
    }
}

/// Exactly four values, one per [`Quadrant`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quadrants<T>([T; 4]);

impl<T> Quadrants<T> {
    /// Wraps an array ordered as [`Quadrant::ALL`].
    pub fn new(values: [T; 4]) -> Self {
        Self(values)
    }

    /// Builds the four values from a function of the quadrant.
    pub fn from_fn(mut f: impl FnMut(Quadrant) -> T) -> Self {
        Self([
            f(Quadrant::NorthWest),
            f(Quadrant::NorthEast),
            f(Quadrant::SouthWest),
            f(Quadrant::SouthEast),
        ])
    }

    /// Iterates `(quadrant, value)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (Quadrant, &T)> {
        Quadrant::ALL.into_iter().zip(self.0.iter())
    }

    /// Mutable variant of [`Quadrants::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Quadrant, &mut T)> {
        Quadrant::ALL.into_iter().zip(self.0.iter_mut())
    }

    /// Iterates the values only.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    /// Applies `f` to each value.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Quadrants<U> {
        Quadrants(self.0.map(f))
    }

    /// Borrows each value.
    pub fn as_ref(&self) -> Quadrants<&T> {
        Quadrants(self.0.each_ref())
    }

    /// Pairs each value with the value of `other` in the same quadrant.
    pub fn zip<U>(self, other: Quadrants<U>) -> Quadrants<(T, U)> {
        let [a, b, c, d] = self.0;
        let [e, f, g, h] = other.0;
        Quadrants([(a, e), (b, f), (c, g), (d, h)])
    }

    /// Unwraps into the underlying array.
    pub fn into_inner(self) -> [T; 4] {
        self.0
    }
}

impl<T> Index<Quadrant> for Quadrants<T> {
    type Output = T;

    fn index(&self, quadrant: Quadrant) -> &T {
        &self.0[quadrant.index()]
    }
}

impl<T> IndexMut<Quadrant> for Quadrants<T> {
    fn index_mut(&mut self, quadrant: Quadrant) -> &mut T {
        &mut self.0[quadrant.index()]
    }
}

impl<T> IntoIterator for Quadrants<T> {
    type Item = (Quadrant, T);
    type IntoIter = std::iter::Zip<std::array::IntoIter<Quadrant, 4>, std::array::IntoIter<T, 4>>;

    fn into_iter(self) -> Self::IntoIter {
        Quadrant::ALL.into_iter().zip(self.0)
    }
}
