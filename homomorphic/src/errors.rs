// -*- mode: rust; -*-
//
// This file is part of `homomorphic`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

use std::fmt::{self, Display, Formatter};

/// Errors produced by the homomorphic encryption schemes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested key size is below the supported minimum.
    KeyTooSmall {
        /// Requested modulus size in bits.
        bits: usize,
        /// Smallest supported modulus size in bits.
        min: usize,
    },
    /// No usable key pair of the requested size was produced.
    KeyGenerationFailed {
        /// Requested modulus size in bits.
        bits: usize,
    },
    /// A public key modulus is not usable (even, or too small).
    InvalidModulus,
    /// A ciphertext is not an element of the ciphertext group.
    MalformedCiphertext,
    /// Ciphertexts or keys from different key pairs were combined.
    KeyMismatch,
    /// `libpaillier` refused an operation on out-of-range operands.
    OperationFailed(&'static str),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Error::KeyTooSmall { bits, min } => write!(
                f,
                "key too small: requested {} bits but at least {} are required",
                bits, min
            ),
            Error::KeyGenerationFailed { bits } => {
                write!(f, "failed to generate a {}-bit key pair", bits)
            }
            Error::InvalidModulus => "invalid public key modulus".fmt(f),
            Error::MalformedCiphertext => "malformed ciphertext".fmt(f),
            Error::KeyMismatch => "ciphertext was produced under a different key".fmt(f),
            Error::OperationFailed(op) => write!(f, "paillier {} failed", op),
        }
    }
}

impl std::error::Error for Error {}
