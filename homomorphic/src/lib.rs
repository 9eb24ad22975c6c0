// -*- mode: rust; -*-
//
// This file is part of `homomorphic`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.
#![deny(missing_docs)]

//! Additively homomorphic public-key encryption.
//!
//! [`HomomorphicScheme`] is the capability the membership protocol is written
//! against. Two implementations are provided:
//!
//! * [`Paillier`], the Paillier cryptosystem from `libpaillier`.
//! * [`PlaintextScheme`], a passthrough "scheme" whose ciphertexts are the
//!   plaintexts themselves. It exists so that protocol arithmetic can be tested
//!   quickly and deterministically.

mod errors;
mod paillier;
mod plaintext;
mod scheme;

pub use crate::{
    errors::Error,
    paillier::{Paillier, PaillierCiphertext, PaillierPrivateKey, PaillierPublicKey, MIN_KEY_BITS},
    plaintext::{PlaintextCiphertext, PlaintextKey, PlaintextScheme},
    scheme::HomomorphicScheme,
};
