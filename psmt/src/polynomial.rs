// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! Encoding a set as the roots of a polynomial over the integers.

use num_bigint::BigInt;
use num_traits::{One, Zero};

/// The monic polynomial `P(x) = (x - s_1)(x - s_2)...(x - s_n)` whose roots are
/// exactly the given integers.
///
/// Coefficients are exact integers, stored leading coefficient first:
/// `[a_n, a_{n-1}, ..., a_1, a_0]` with `a_n = 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootPolynomial {
    coefficients: Vec<BigInt>,
}

impl RootPolynomial {
    /// Build the polynomial with roots `roots`.
    ///
    /// The roots are expected to be distinct; a repeated root shows up as a
    /// repeated factor. No roots gives the constant polynomial `1`, which has
    /// no zeros at all.
    pub fn from_roots(roots: &[BigInt]) -> Self {
        let mut coefficients = Vec::with_capacity(roots.len() + 1);
        coefficients.push(BigInt::one());
        for s in roots {
            // Multiply by (x - s): appending a zero shifts every coefficient up
            // one degree, then each position picks up `-s` times its left
            // neighbour.
            coefficients.push(BigInt::zero());
            for i in (1..coefficients.len()).rev() {
                let scaled = &coefficients[i - 1] * s;
                coefficients[i] -= scaled;
            }
        }
        RootPolynomial { coefficients }
    }

    /// The degree `n`, i.e. the number of roots.
    #[inline]
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// All coefficients, leading coefficient first.
    #[inline]
    pub fn coefficients(&self) -> &[BigInt] {
        &self.coefficients
    }

    /// The coefficient `a_k` of `x^k`.
    ///
    /// # Panics
    /// Panics if `k` exceeds the degree.
    #[inline]
    pub fn coefficient(&self, k: usize) -> &BigInt {
        &self.coefficients[self.degree() - k]
    }

    /// The constant term `a_0`.
    #[inline]
    pub fn constant(&self) -> &BigInt {
        self.coefficient(0)
    }

    /// The non-constant terms as `(k, a_k)` for `k = 1..=n`.
    pub fn terms(&self) -> impl Iterator<Item = (usize, &BigInt)> + '_ {
        (1..=self.degree()).map(move |k| (k, self.coefficient(k)))
    }

    /// Evaluate the polynomial at `x` in plain integer arithmetic.
    pub fn eval(&self, x: &BigInt) -> BigInt {
        self.coefficients
            .iter()
            .fold(BigInt::zero(), |acc, a| acc * x + a)
    }
}
