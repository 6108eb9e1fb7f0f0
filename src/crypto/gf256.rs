//! Arithmetic in GF(2⁸).
//!
//! The field is pinned to the AES construction: elements are polynomials over
//! GF(2) reduced modulo the irreducible polynomial
//! `x⁸ + x⁴ + x³ + x + 1` (`0x11B`), with `x + 1` (`0x03`) as generator for the
//! log/exp tables. Splitting and combining must agree on this choice; a
//! different polynomial does not fail, it silently yields a different secret.

use std::ops::{Add, Mul};

/// Irreducible reduction polynomial (x⁸ + x⁴ + x³ + x + 1).
pub const REDUCING_POLYNOMIAL: u16 = 0x11B;

/// Multiplicative generator used to build [`EXP`] and [`LOG`].
pub const GENERATOR: u8 = 0x03;

/// Carry-less multiply with reduction, bit by bit. Only used to build tables.
const fn slow_mul(mut a: u8, mut b: u8) -> u8 {
    let mut acc = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            acc ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= (REDUCING_POLYNOMIAL & 0xFF) as u8;
        }
        b >>= 1;
    }
    acc
}

const fn build_tables() -> ([u8; 255], [u8; 256]) {
    let mut exp = [0u8; 255];
    let mut log = [0u8; 256];
    let mut x = 1u8;
    let mut i = 0;
    while i < 255 {
        exp[i] = x;
        log[x as usize] = i as u8;
        x = slow_mul(x, GENERATOR);
        i += 1;
    }
    (exp, log)
}

const TABLES: ([u8; 255], [u8; 256]) = build_tables();

/// `EXP[i] = GENERATOR^i`.
pub(crate) const EXP: [u8; 255] = TABLES.0;

/// Inverse of [`EXP`]; `LOG[0]` is unused.
pub(crate) const LOG: [u8; 256] = TABLES.1;

/// A single field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gf256(pub u8);

impl Gf256 {
    pub const ZERO: Self = Gf256(0);
    pub const ONE: Self = Gf256(1);

    /// Multiplicative inverse; `None` for zero.
    pub fn inverse(self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }
        let log = LOG[self.0 as usize] as usize;
        Some(Gf256(EXP[(255 - log) % 255]))
    }

    /// Evaluate `coeffs[0] + coeffs[1]·x + ...` at `x` (Horner).
    pub fn eval_polynomial(coeffs: &[Self], x: Self) -> Self {
        coeffs
            .iter()
            .rev()
            .fold(Gf256::ZERO, |acc, &c| acc * x + c)
    }

    /// Lagrange interpolation of `f(0)` from points with distinct x.
    ///
    /// Returns `None` when two points share an x-coordinate.
    pub fn interpolate_at_zero(points: &[(Self, Self)]) -> Option<Self> {
        let mut acc = Gf256::ZERO;

        for (i, &(xi, yi)) in points.iter().enumerate() {
            let mut num = Gf256::ONE;
            let mut den = Gf256::ONE;

            for (j, &(xj, _)) in points.iter().enumerate() {
                if i != j {
                    // 0 - xj == xj and xi - xj == xi + xj in characteristic 2
                    num = num * xj;
                    den = den * (xi + xj);
                }
            }

            acc = acc + yi * num * den.inverse()?;
        }

        Some(acc)
    }
}

impl Add for Gf256 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Gf256(self.0 ^ rhs.0)
    }
}

impl Mul for Gf256 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        if self.0 == 0 || rhs.0 == 0 {
            return Gf256::ZERO;
        }
        let log = LOG[self.0 as usize] as usize + LOG[rhs.0 as usize] as usize;
        Gf256(EXP[log % 255])
    }
}
