//! Three-Valued Boolean Primitives
//!
//! Every cell of a [`TernMatrix`](crate::TernMatrix) holds one [`Tern`].
//!
//! # Representation
//!
//! Tern: {F, U, T} = {false, unknown, true}, totally ordered F < U < T.
//!
//! # Algebraic Properties (Must Hold)
//!
//! ## Conjunction / disjunction
//! - AND is `min`, OR is `max` under the order above
//! - Both are commutative, associative and idempotent
//! - Identities: a AND T = a, a OR F = a
//! - Annihilators: a AND F = F, a OR T = T
//!
//! ## Negation
//! - NOT swaps F and T, fixes U
//! - De Morgan: NOT(a AND b) = NOT a OR NOT b
//!
//! ## Exclusive or
//! - Boolean xor on known values, U if either operand is U
//!
//! U never contributes to reconstruction error; see
//! [`TernMatrix::reconstruction_error`](crate::TernMatrix::reconstruction_error).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Single three-valued boolean
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tern {
    /// False
    #[default]
    F = 0,
    /// Unknown / missing
    U = 1,
    /// True
    T = 2,
}

impl fmt::Debug for Tern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tern::F => write!(f, "F"),
            Tern::U => write!(f, "U"),
            Tern::T => write!(f, "T"),
        }
    }
}

impl fmt::Display for Tern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl Tern {
    /// All values in ascending order
    pub const ALL: [Tern; 3] = [Tern::F, Tern::U, Tern::T];

    #[inline]
    pub const fn from_bool(b: bool) -> Self {
        if b {
            Tern::T
        } else {
            Tern::F
        }
    }

    /// Known value as bool, `None` for U
    #[inline]
    pub const fn to_bool(self) -> Option<bool> {
        match self {
            Tern::F => Some(false),
            Tern::U => None,
            Tern::T => Some(true),
        }
    }

    #[inline]
    pub const fn is_known(self) -> bool {
        !matches!(self, Tern::U)
    }

    #[inline]
    pub const fn is_true(self) -> bool {
        matches!(self, Tern::T)
    }

    #[inline]
    pub const fn is_false(self) -> bool {
        matches!(self, Tern::F)
    }

    /// Conjunction (min)
    ///
    /// ```text
    ///  AND | F  U  T
    /// -----+--------
    ///   F  | F  F  F
    ///   U  | F  U  U
    ///   T  | F  U  T
    /// ```
    #[inline]
    pub const fn and(self, other: Tern) -> Tern {
        if (self as u8) < (other as u8) {
            self
        } else {
            other
        }
    }

    /// Disjunction (max)
    #[inline]
    pub const fn or(self, other: Tern) -> Tern {
        if (self as u8) > (other as u8) {
            self
        } else {
            other
        }
    }

    /// Exclusive or; unknown is contagious
    #[inline]
    pub const fn xor(self, other: Tern) -> Tern {
        match (self, other) {
            (Tern::U, _) | (_, Tern::U) => Tern::U,
            (Tern::T, Tern::T) | (Tern::F, Tern::F) => Tern::F,
            _ => Tern::T,
        }
    }

    /// Negation: F <-> T, U fixed
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub const fn not(self) -> Tern {
        match self {
            Tern::F => Tern::T,
            Tern::U => Tern::U,
            Tern::T => Tern::F,
        }
    }

    /// Text form used by matrix rendering: `0`, `?`, `1`
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Tern::F => '0',
            Tern::U => '?',
            Tern::T => '1',
        }
    }

    /// Inverse of [`Tern::to_char`]; `.` is accepted as F as well
    #[inline]
    pub const fn from_char(c: char) -> Option<Tern> {
        match c {
            '0' | '.' => Some(Tern::F),
            '?' => Some(Tern::U),
            '1' => Some(Tern::T),
            _ => None,
        }
    }
}

impl From<bool> for Tern {
    fn from(b: bool) -> Self {
        Tern::from_bool(b)
    }
}

impl std::ops::Not for Tern {
    type Output = Tern;
    #[inline]
    fn not(self) -> Tern {
        Tern::not(self)
    }
}

impl std::ops::BitAnd for Tern {
    type Output = Tern;
    #[inline]
    fn bitand(self, rhs: Tern) -> Tern {
        Tern::and(self, rhs)
    }
}

impl std::ops::BitOr for Tern {
    type Output = Tern;
    #[inline]
    fn bitor(self, rhs: Tern) -> Tern {
        Tern::or(self, rhs)
    }
}

impl std::ops::BitXor for Tern {
    type Output = Tern;
    #[inline]
    fn bitxor(self, rhs: Tern) -> Tern {
        Tern::xor(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_truth_table() {
        assert_eq!(Tern::F & Tern::F, Tern::F);
        assert_eq!(Tern::F & Tern::U, Tern::F);
        assert_eq!(Tern::F & Tern::T, Tern::F);
        assert_eq!(Tern::U & Tern::U, Tern::U);
        assert_eq!(Tern::U & Tern::T, Tern::U);
        assert_eq!(Tern::T & Tern::T, Tern::T);
    }

    #[test]
    fn test_or_truth_table() {
        assert_eq!(Tern::F | Tern::F, Tern::F);
        assert_eq!(Tern::F | Tern::U, Tern::U);
        assert_eq!(Tern::F | Tern::T, Tern::T);
        assert_eq!(Tern::U | Tern::U, Tern::U);
        assert_eq!(Tern::U | Tern::T, Tern::T);
        assert_eq!(Tern::T | Tern::T, Tern::T);
    }

    #[test]
    fn test_and_or_commutative_associative() {
        for &a in &Tern::ALL {
            for &b in &Tern::ALL {
                assert_eq!(a & b, b & a, "AND commutativity: {:?} {:?}", a, b);
                assert_eq!(a | b, b | a, "OR commutativity: {:?} {:?}", a, b);
                for &c in &Tern::ALL {
                    assert_eq!((a & b) & c, a & (b & c));
                    assert_eq!((a | b) | c, a | (b | c));
                }
            }
        }
    }

    #[test]
    fn test_de_morgan() {
        for &a in &Tern::ALL {
            for &b in &Tern::ALL {
                assert_eq!(!(a & b), !a | !b, "De Morgan for {:?} {:?}", a, b);
                assert_eq!(!(a | b), !a & !b, "De Morgan for {:?} {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_negation() {
        assert_eq!(!Tern::F, Tern::T);
        assert_eq!(!Tern::U, Tern::U);
        assert_eq!(!Tern::T, Tern::F);
        for &t in &Tern::ALL {
            assert_eq!(!!t, t, "Double negation of {:?}", t);
        }
    }

    #[test]
    fn test_xor_unknown_is_contagious() {
        assert_eq!(Tern::T ^ Tern::T, Tern::F);
        assert_eq!(Tern::T ^ Tern::F, Tern::T);
        assert_eq!(Tern::F ^ Tern::F, Tern::F);
        for &t in &Tern::ALL {
            assert_eq!(t ^ Tern::U, Tern::U);
        }
    }

    #[test]
    fn test_char_roundtrip() {
        for &t in &Tern::ALL {
            assert_eq!(Tern::from_char(t.to_char()), Some(t));
        }
        assert_eq!(Tern::from_char('.'), Some(Tern::F));
        assert_eq!(Tern::from_char('x'), None);
    }
}
