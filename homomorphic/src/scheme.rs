// -*- mode: rust; -*-
//
// This file is part of `homomorphic`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

use crate::Error;
use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;

/// An additively homomorphic public-key encryption scheme.
///
/// Plaintexts are signed integers. Each scheme documents how it maps them into
/// its plaintext space; for every implementation the following must hold for
/// plaintexts small enough not to wrap around:
///
/// * `decrypt(add(encrypt(a), encrypt(b))) == a + b`
/// * `decrypt(scalar_mul(encrypt(a), k)) == a * k`, including negative and
///   zero `k`.
///
/// Ciphertexts remember which key they were produced under, so the
/// homomorphic operations need no key argument.
pub trait HomomorphicScheme {
    /// Key used for encryption. Safe to hand to the other party.
    type PublicKey: Clone + Debug;
    /// Key used for decryption.
    type PrivateKey;
    /// An encrypted integer.
    type Ciphertext: Clone + Debug;

    /// Generate a fresh key pair with a `bits`-bit modulus.
    fn keygen<RNG: CryptoRng + RngCore>(
        &self,
        bits: usize,
        rng: &mut RNG,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Error>;

    /// Encrypt `m` under `pk`.
    fn encrypt<RNG: CryptoRng + RngCore>(
        &self,
        pk: &Self::PublicKey,
        m: &BigInt,
        rng: &mut RNG,
    ) -> Result<Self::Ciphertext, Error>;

    /// Decrypt `ct` with `sk`.
    fn decrypt(&self, sk: &Self::PrivateKey, ct: &Self::Ciphertext) -> Result<BigInt, Error>;

    /// Homomorphic addition: returns an encryption of `a + b`.
    fn add(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext, Error>;

    /// Homomorphic scalar multiplication: returns an encryption of `ct * k`.
    fn scalar_mul(&self, ct: &Self::Ciphertext, k: &BigInt) -> Result<Self::Ciphertext, Error>;
}
