// -*- mode: rust; -*-
//
// This file is part of `homomorphic`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! A passthrough scheme that performs no encryption at all.
//!
//! Ciphertexts are the plaintext integers and the homomorphic operations are
//! exact integer arithmetic. It satisfies the [`HomomorphicScheme`] laws
//! without wraparound, which makes it useful for testing code written against
//! the trait. It offers no privacy whatsoever.

use crate::{Error, HomomorphicScheme};
use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};

/// The passthrough scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaintextScheme;

/// Key of the passthrough scheme. Public and private keys are the same value,
/// which only remembers the requested size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaintextKey {
    bits: usize,
}

/// A "ciphertext" of the passthrough scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaintextCiphertext(BigInt);

impl PlaintextKey {
    /// Make a key of the given nominal size.
    pub fn new(bits: usize) -> Self {
        PlaintextKey { bits }
    }

    /// The nominal key size.
    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl PlaintextCiphertext {
    /// Wrap an integer.
    pub fn new(value: BigInt) -> Self {
        PlaintextCiphertext(value)
    }

    /// The wrapped integer.
    pub fn value(&self) -> &BigInt {
        &self.0
    }
}

impl HomomorphicScheme for PlaintextScheme {
    type PublicKey = PlaintextKey;
    type PrivateKey = PlaintextKey;
    type Ciphertext = PlaintextCiphertext;

    fn keygen<RNG: CryptoRng + RngCore>(
        &self,
        bits: usize,
        _rng: &mut RNG,
    ) -> Result<(PlaintextKey, PlaintextKey), Error> {
        let key = PlaintextKey::new(bits);
        Ok((key.clone(), key))
    }

    fn encrypt<RNG: CryptoRng + RngCore>(
        &self,
        _pk: &PlaintextKey,
        m: &BigInt,
        _rng: &mut RNG,
    ) -> Result<PlaintextCiphertext, Error> {
        Ok(PlaintextCiphertext(m.clone()))
    }

    fn decrypt(&self, _sk: &PlaintextKey, ct: &PlaintextCiphertext) -> Result<BigInt, Error> {
        Ok(ct.0.clone())
    }

    fn add(
        &self,
        a: &PlaintextCiphertext,
        b: &PlaintextCiphertext,
    ) -> Result<PlaintextCiphertext, Error> {
        Ok(PlaintextCiphertext(&a.0 + &b.0))
    }

    fn scalar_mul(&self, ct: &PlaintextCiphertext, k: &BigInt) -> Result<PlaintextCiphertext, Error> {
        Ok(PlaintextCiphertext(&ct.0 * k))
    }
}
