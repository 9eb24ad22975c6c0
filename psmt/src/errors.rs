// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

/// Errors produced by the private set-membership protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A client operation that needs key material ran before key generation.
    KeysNotInitialized,
    /// The number of encrypted powers disagrees with the polynomial degree.
    DegreeMismatch {
        /// Degree of the server's polynomial.
        expected: usize,
        /// Number of encrypted powers received.
        got: usize,
    },
    /// The blinding factor upper bound must be at least one.
    InvalidBlindingFactor(u64),
    /// The underlying homomorphic scheme failed.
    SchemeError(homomorphic::Error),
}

impl From<homomorphic::Error> for Error {
    #[inline]
    fn from(e: homomorphic::Error) -> Error {
        Error::SchemeError(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::KeysNotInitialized => {
                write!(f, "keys not initialized: generate keys before using the client")
            }
            Error::DegreeMismatch { expected, got } => write!(
                f,
                "degree mismatch: expected {} encrypted powers, got {}",
                expected, got
            ),
            Error::InvalidBlindingFactor(max) => {
                write!(f, "invalid blinding factor bound {}: must be at least 1", max)
            }
            Error::SchemeError(e) => write!(f, "homomorphic scheme error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SchemeError(e) => Some(e),
            _ => None,
        }
    }
}
