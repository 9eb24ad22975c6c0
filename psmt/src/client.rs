// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! The querying party.

use crate::{server::BlindedResult, Error, SemiHonest};
use homomorphic::HomomorphicScheme;
use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::fmt;

// Holds the private key, which never leaves the client.
pub(crate) enum KeyState<S: HomomorphicScheme> {
    Uninitialized,
    Ready {
        public: S::PublicKey,
        private: S::PrivateKey,
    },
}

impl<S: HomomorphicScheme> fmt::Debug for KeyState<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyState::Uninitialized => f.write_str("Uninitialized"),
            KeyState::Ready { public, .. } => f
                .debug_struct("Ready")
                .field("public", public)
                .finish_non_exhaustive(),
        }
    }
}

/// The encryptions `[Enc(c), Enc(c^2), ..., Enc(c^n)]` of the powers of a
/// query `c`, ordered by exponent.
#[derive(Clone, Debug)]
pub struct EncryptedPowers<C> {
    powers: Vec<C>,
}

impl<C> EncryptedPowers<C> {
    /// Wrap ciphertexts received from a client; `powers[k - 1]` must encrypt
    /// `c^k`.
    pub fn new(powers: Vec<C>) -> Self {
        EncryptedPowers { powers }
    }

    /// The number of powers, which is the highest exponent.
    #[inline]
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    /// Whether there are no powers at all (a query against an empty set).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// The encryption of `c^k`, for `k` in `1..=len()`.
    #[inline]
    pub fn power(&self, k: usize) -> Option<&C> {
        k.checked_sub(1).and_then(|i| self.powers.get(i))
    }

    /// Iterate over the ciphertexts in exponent order.
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.powers.iter()
    }
}

/// The client of the membership protocol: holds the query and the key pair.
pub struct Client<S: HomomorphicScheme> {
    scheme: S,
    keys: KeyState<S>,
}

impl<S: HomomorphicScheme> Client<S> {
    /// Make a client without keys.
    pub fn new(scheme: S) -> Self {
        Client {
            scheme,
            keys: KeyState::Uninitialized,
        }
    }

    /// The scheme this client encrypts with.
    #[inline]
    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Whether a key pair has been generated.
    #[inline]
    pub fn has_keys(&self) -> bool {
        matches!(self.keys, KeyState::Ready { .. })
    }

    /// Generate a fresh key pair of `bits` bits, replacing any previous one,
    /// and return the public key to send to the server.
    pub fn generate_keys<RNG: CryptoRng + RngCore>(
        &mut self,
        bits: usize,
        rng: &mut RNG,
    ) -> Result<S::PublicKey, Error> {
        let (public, private) = self.scheme.keygen(bits, rng)?;
        debug!("client generated a {}-bit key pair", bits);
        self.keys = KeyState::Ready {
            public: public.clone(),
            private,
        };
        Ok(public)
    }

    /// The public key, if keys have been generated.
    pub fn public_key(&self) -> Result<&S::PublicKey, Error> {
        match &self.keys {
            KeyState::Ready { public, .. } => Ok(public),
            KeyState::Uninitialized => Err(Error::KeysNotInitialized),
        }
    }

    /// Encrypt `c, c^2, ..., c^n` independently under the client's public key.
    ///
    /// `n` must be the degree of the server's polynomial. Powers are computed
    /// exactly; any reduction happens inside the scheme.
    pub fn encrypt_query<RNG: CryptoRng + RngCore>(
        &self,
        c: &BigInt,
        n: usize,
        rng: &mut RNG,
    ) -> Result<EncryptedPowers<S::Ciphertext>, Error> {
        let pk = self.public_key()?;
        let mut powers = Vec::new();
        let mut power = BigInt::one();
        for _ in 0..n {
            power *= c;
            powers.push(self.scheme.encrypt(pk, &power, rng)?);
        }
        debug!("client encrypted {} powers of its query", n);
        Ok(EncryptedPowers::new(powers))
    }

    /// Decrypt the server's blinded answer. The answer is consumed: it is
    /// meant to be decrypted once.
    pub fn decrypt_result(
        &self,
        blinded: BlindedResult<S::Ciphertext>,
    ) -> Result<BigInt, Error> {
        match &self.keys {
            KeyState::Ready { private, .. } => {
                Ok(self.scheme.decrypt(private, blinded.ciphertext())?)
            }
            KeyState::Uninitialized => Err(Error::KeysNotInitialized),
        }
    }

    /// The membership verdict: the query is in the set iff the decrypted
    /// answer is exactly zero.
    #[inline]
    pub fn check_membership(&self, decrypted: &BigInt) -> bool {
        decrypted.is_zero()
    }
}

impl<S: HomomorphicScheme + fmt::Debug> fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Client")
            .field("scheme", &self.scheme)
            .field("keys", &self.keys)
            .finish()
    }
}

impl<S: HomomorphicScheme> SemiHonest for Client<S> {}
