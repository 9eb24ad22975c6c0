// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! The dataset holder.

use crate::{client::EncryptedPowers, polynomial::RootPolynomial, Error, SemiHonest};
use homomorphic::HomomorphicScheme;
use itertools::Itertools;
use log::{debug, trace};
use num_bigint::BigInt;
use num_traits::Zero;
use rand::{CryptoRng, Rng, RngCore};

/// Default upper bound (inclusive) on the multiplicative blinding factor.
pub const DEFAULT_MAX_BLINDING_FACTOR: u64 = 1000;

/// The encryption of `P(c)` under the client's key, before blinding.
#[derive(Clone, Debug)]
pub struct EvaluationResult<C> {
    ciphertext: C,
}

impl<C> EvaluationResult<C> {
    /// Wrap an encryption of `P(c)`.
    pub fn new(ciphertext: C) -> Self {
        EvaluationResult { ciphertext }
    }

    /// The encryption of `P(c)`.
    pub fn ciphertext(&self) -> &C {
        &self.ciphertext
    }
}

/// The encryption of `r * P(c)`, as returned to the client.
#[derive(Clone, Debug)]
pub struct BlindedResult<C> {
    ciphertext: C,
}

impl<C> BlindedResult<C> {
    /// Wrap a blinded ciphertext, e.g. one read off the network.
    pub fn new(ciphertext: C) -> Self {
        BlindedResult { ciphertext }
    }

    /// The blinded ciphertext.
    pub fn ciphertext(&self) -> &C {
        &self.ciphertext
    }

    /// Unwrap the blinded ciphertext.
    pub fn into_ciphertext(self) -> C {
        self.ciphertext
    }
}

/// The server of the membership protocol: holds the private dataset and its
/// root polynomial.
///
/// A server is immutable after construction, so one instance can answer many
/// clients concurrently.
#[derive(Debug)]
pub struct Server<S: HomomorphicScheme> {
    scheme: S,
    dataset: Vec<BigInt>,
    polynomial: RootPolynomial,
}

impl<S: HomomorphicScheme> Server<S> {
    /// Build a server over `dataset`. Duplicates are removed (keeping the
    /// first occurrence) before the polynomial is built, so its degree is the
    /// number of distinct elements.
    pub fn new<I>(scheme: S, dataset: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<BigInt>,
    {
        let dataset = dataset.into_iter().map(Into::into).unique().collect::<Vec<_>>();
        let polynomial = RootPolynomial::from_roots(&dataset);
        debug!(
            "server built a degree {} polynomial over its dataset",
            polynomial.degree()
        );
        Server {
            scheme,
            dataset,
            polynomial,
        }
    }

    /// The scheme this server computes with.
    #[inline]
    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// The deduplicated dataset, in first-occurrence order.
    #[inline]
    pub fn dataset(&self) -> &[BigInt] {
        &self.dataset
    }

    /// The degree of the root polynomial; a client must send this many
    /// encrypted powers.
    #[inline]
    pub fn degree(&self) -> usize {
        self.polynomial.degree()
    }

    /// The root polynomial.
    #[inline]
    pub fn polynomial(&self) -> &RootPolynomial {
        &self.polynomial
    }

    /// The coefficients of the root polynomial, leading first.
    #[inline]
    pub fn coefficients(&self) -> &[BigInt] {
        self.polynomial.coefficients()
    }

    /// Compute `Enc(P(c)) = Enc(a_0) + sum_k Enc(c^k) * a_k` from the client's
    /// encrypted powers. Terms with a zero coefficient are skipped.
    pub fn evaluate_polynomial_homomorphically<RNG: CryptoRng + RngCore>(
        &self,
        pk: &S::PublicKey,
        powers: &EncryptedPowers<S::Ciphertext>,
        rng: &mut RNG,
    ) -> Result<EvaluationResult<S::Ciphertext>, Error> {
        if powers.len() != self.degree() {
            return Err(Error::DegreeMismatch {
                expected: self.degree(),
                got: powers.len(),
            });
        }
        let mut acc = self.scheme.encrypt(pk, self.polynomial.constant(), rng)?;
        for ((k, a_k), power) in self.polynomial.terms().zip(powers.iter()) {
            if a_k.is_zero() {
                trace!("skipping zero coefficient of x^{}", k);
                continue;
            }
            let term = self.scheme.scalar_mul(power, a_k)?;
            acc = self.scheme.add(&acc, &term)?;
        }
        debug!("server evaluated its polynomial on {} powers", powers.len());
        Ok(EvaluationResult::new(acc))
    }

    /// Multiply the evaluation by a uniform `r` in `1..=max_blinding_factor`,
    /// hiding the magnitude of a nonzero `P(c)` while preserving zero.
    pub fn blind_and_return<RNG: CryptoRng + RngCore>(
        &self,
        evaluation: EvaluationResult<S::Ciphertext>,
        max_blinding_factor: u64,
        rng: &mut RNG,
    ) -> Result<BlindedResult<S::Ciphertext>, Error> {
        if max_blinding_factor == 0 {
            return Err(Error::InvalidBlindingFactor(max_blinding_factor));
        }
        let r = rng.gen_range(1..=max_blinding_factor);
        trace!("server blinding with r = {}", r);
        let blinded = self
            .scheme
            .scalar_mul(evaluation.ciphertext(), &BigInt::from(r))?;
        Ok(BlindedResult::new(blinded))
    }
}

impl<S: HomomorphicScheme> SemiHonest for Server<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use homomorphic::{PlaintextCiphertext, PlaintextKey, PlaintextScheme};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn plaintext(v: i64) -> EvaluationResult<PlaintextCiphertext> {
        EvaluationResult::new(PlaintextCiphertext::new(BigInt::from(v)))
    }

    #[test]
    fn test_duplicates_are_removed() {
        let server = Server::new(PlaintextScheme, [5, 3, 5, 7, 3]);
        assert_eq!(
            server.dataset(),
            &[BigInt::from(5), BigInt::from(3), BigInt::from(7)]
        );
        assert_eq!(server.degree(), 3);
        assert_eq!(server.coefficients().len(), 4);
    }

    #[test]
    fn test_degree_mismatch() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let server = Server::new(PlaintextScheme, [1, 2, 3]);
        let mut client = Client::new(PlaintextScheme);
        let pk = client.generate_keys(1024, &mut rng).unwrap();
        let powers = client.encrypt_query(&BigInt::from(2), 2, &mut rng).unwrap();
        let err = server
            .evaluate_polynomial_homomorphically(&pk, &powers, &mut rng)
            .unwrap_err();
        assert_eq!(err, Error::DegreeMismatch { expected: 3, got: 2 });
    }

    #[test]
    fn test_empty_dataset_evaluates_to_one() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let server = Server::new(PlaintextScheme, Vec::<i64>::new());
        let pk = PlaintextKey::new(1024);
        let eval = server
            .evaluate_polynomial_homomorphically(&pk, &EncryptedPowers::new(vec![]), &mut rng)
            .unwrap();
        assert_eq!(eval.ciphertext().value(), &BigInt::from(1));
    }

    #[test]
    fn test_invalid_blinding_bound() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let server = Server::new(PlaintextScheme, [1]);
        let err = server.blind_and_return(plaintext(4), 0, &mut rng).unwrap_err();
        assert_eq!(err, Error::InvalidBlindingFactor(0));
    }

    #[test]
    fn test_blinding_factor_is_drawn_from_rng() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut replay = rng.clone();
        let server = Server::new(PlaintextScheme, [1]);
        let blinded = server.blind_and_return(plaintext(-6), 1000, &mut rng).unwrap();
        let r: u64 = replay.gen_range(1..=1000);
        assert_eq!(blinded.ciphertext().value(), &(BigInt::from(-6) * r));
    }

    #[test]
    fn test_bound_of_one_leaves_value_unchanged() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let server = Server::new(PlaintextScheme, [1]);
        let blinded = server.blind_and_return(plaintext(42), 1, &mut rng).unwrap();
        assert_eq!(blinded.into_ciphertext().value(), &BigInt::from(42));
    }

    #[test]
    fn test_blinding_varies() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let server = Server::new(PlaintextScheme, [1]);
        let values = (0..32)
            .map(|_| {
                server
                    .blind_and_return(plaintext(1), DEFAULT_MAX_BLINDING_FACTOR, &mut rng)
                    .unwrap()
                    .into_ciphertext()
                    .value()
                    .clone()
            })
            .unique()
            .count();
        assert!(values > 1);
    }

    proptest! {
        #[test]
        fn prop_blinding_preserves_zero_and_sign(v in -1000i64..1000, seed: u64) {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let server = Server::new(PlaintextScheme, [1]);
            let blinded = server.blind_and_return(plaintext(v), 1000, &mut rng).unwrap();
            let out = blinded.ciphertext().value();
            if v == 0 {
                prop_assert!(out.is_zero());
            } else {
                prop_assert_eq!(out.sign(), BigInt::from(v).sign());
                prop_assert!(out.magnitude() >= BigInt::from(v).magnitude());
                prop_assert!(out.magnitude() <= &(BigInt::from(v).magnitude() * 1000u32));
            }
        }

        #[test]
        fn prop_evaluation_matches_plain_polynomial(
            dataset in proptest::collection::vec(-50i64..50, 0..8),
            c in -50i64..50,
        ) {
            let mut rng = ChaCha20Rng::seed_from_u64(6);
            let server = Server::new(PlaintextScheme, dataset);
            let mut client = Client::new(PlaintextScheme);
            let pk = client.generate_keys(1024, &mut rng).unwrap();
            let c = BigInt::from(c);
            let powers = client.encrypt_query(&c, server.degree(), &mut rng).unwrap();
            let eval = server.evaluate_polynomial_homomorphically(&pk, &powers, &mut rng).unwrap();
            prop_assert_eq!(eval.ciphertext().value(), &server.polynomial().eval(&c));
        }
    }
}
