// -*- mode: rust; -*-
//
// This file is part of `homomorphic`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! The Paillier cryptosystem, as implemented by `libpaillier`.
//!
//! This module adapts `libpaillier` to [`HomomorphicScheme`]. Signed
//! plaintexts are mapped into `ℤ_n` by reduction modulo `n`, so values wrap
//! around. Decryption returns the representative closest to zero, i.e. a value
//! in `(-n/2, n/2]`. Callers whose plaintexts may exceed `n/2` in magnitude
//! observe that wraparound.

use crate::{Error, HomomorphicScheme};
use libpaillier::{unknown_order::BigNumber, DecryptionKey, EncryptionKey};
use log::debug;
use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::{fmt, sync::Arc};

/// Smallest accepted modulus size in bits.
pub const MIN_KEY_BITS: usize = 128;

/// Number of times key generation redraws the prime pair.
const KEYGEN_ATTEMPTS: usize = 16;

fn to_number(x: &BigUint) -> BigNumber {
    BigNumber::from_slice(&x.to_bytes_be())
}

fn from_number(x: &BigNumber) -> BigUint {
    BigUint::from_bytes_be(&x.to_bytes())
}

struct Modulus {
    key: EncryptionKey,
    n: BigUint,
    n_squared: BigUint,
    half_n: BigUint,
}

impl Modulus {
    fn new(key: EncryptionKey, n: BigUint) -> Self {
        let n_squared = &n * &n;
        let half_n = &n >> 1usize;
        Modulus {
            key,
            n,
            n_squared,
            half_n,
        }
    }
}

impl PartialEq for Modulus {
    fn eq(&self, other: &Modulus) -> bool {
        self.n == other.n
    }
}

impl Eq for Modulus {}

impl fmt::Debug for Modulus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Modulus").field("n", &self.n).finish_non_exhaustive()
    }
}

/// The Paillier scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct Paillier;

/// A Paillier public key, i.e. the modulus `n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaillierPublicKey {
    modulus: Arc<Modulus>,
}

/// A Paillier private key.
pub struct PaillierPrivateKey {
    public: PaillierPublicKey,
    key: DecryptionKey,
}

/// A Paillier ciphertext: an element of `ℤ*_{n²}` tagged with its key.
#[derive(Clone)]
pub struct PaillierCiphertext {
    value: BigUint,
    modulus: Arc<Modulus>,
}

impl PaillierPublicKey {
    /// Rebuild a public key from its modulus, e.g. after receiving it from the
    /// key owner.
    pub fn from_modulus(n: BigUint) -> Result<Self, Error> {
        if n.is_even() || n.bits() < MIN_KEY_BITS as u64 {
            return Err(Error::InvalidModulus);
        }
        let key =
            EncryptionKey::from_bytes(&n.to_bytes_be()).map_err(|_| Error::InvalidModulus)?;
        Ok(PaillierPublicKey {
            modulus: Arc::new(Modulus::new(key, n)),
        })
    }

    /// The modulus `n`.
    #[inline]
    pub fn n(&self) -> &BigUint {
        &self.modulus.n
    }

    /// Size of the modulus in bits.
    #[inline]
    pub fn bits(&self) -> u64 {
        self.modulus.n.bits()
    }

    /// Wrap a raw ciphertext value received from the network, checking that
    /// it lies in `ℤ*_{n²}`.
    pub fn ciphertext_from_value(&self, value: BigUint) -> Result<PaillierCiphertext, Error> {
        let m = &self.modulus;
        if value.is_zero() || value >= m.n_squared || !value.gcd(&m.n).is_one() {
            return Err(Error::MalformedCiphertext);
        }
        Ok(self.wrap(value))
    }

    fn wrap(&self, value: BigUint) -> PaillierCiphertext {
        PaillierCiphertext {
            value,
            modulus: self.modulus.clone(),
        }
    }

    // Signed integer -> ℤ_n.
    fn encode(&self, m: &BigInt) -> BigUint {
        let n = BigInt::from_biguint(Sign::Plus, self.modulus.n.clone());
        // `mod_floor` is non-negative for a positive modulus.
        m.mod_floor(&n).magnitude().clone()
    }

    // ℤ_n -> signed integer in (-n/2, n/2].
    fn decode(&self, m: BigUint) -> BigInt {
        if m > self.modulus.half_n {
            BigInt::from_biguint(Sign::Minus, &self.modulus.n - m)
        } else {
            BigInt::from_biguint(Sign::Plus, m)
        }
    }

    fn random_unit<RNG: CryptoRng + RngCore>(&self, rng: &mut RNG) -> BigUint {
        let n = &self.modulus.n;
        loop {
            let r = rng.gen_biguint_below(n);
            if !r.is_zero() && r.gcd(n).is_one() {
                return r;
            }
        }
    }

    // Encrypt `m` in `1..n` with a nonce drawn from `rng`.
    fn encrypt_unit<RNG: CryptoRng + RngCore>(
        &self,
        m: &BigUint,
        rng: &mut RNG,
    ) -> Result<PaillierCiphertext, Error> {
        let nonce = to_number(&self.random_unit(rng));
        let (c, _) = self
            .modulus
            .key
            .encrypt(&m.to_bytes_be(), Some(nonce))
            .ok_or(Error::OperationFailed("encrypt"))?;
        Ok(self.wrap(from_number(&c)))
    }

    fn add_values(&self, a: &BigUint, b: &BigUint) -> Result<PaillierCiphertext, Error> {
        let c = self
            .modulus
            .key
            .add(&to_number(a), &to_number(b))
            .ok_or(Error::OperationFailed("add"))?;
        Ok(self.wrap(from_number(&c)))
    }

    fn mul_value(&self, a: &BigUint, k: &BigUint) -> Result<PaillierCiphertext, Error> {
        let c = self
            .modulus
            .key
            .mul(&to_number(a), &to_number(k))
            .ok_or(Error::OperationFailed("mul"))?;
        Ok(self.wrap(from_number(&c)))
    }
}

impl PaillierPrivateKey {
    /// The matching public key.
    #[inline]
    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public
    }
}

impl fmt::Debug for PaillierPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PaillierPrivateKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl PaillierCiphertext {
    /// The raw value in `ℤ*_{n²}`.
    #[inline]
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Whether this ciphertext was produced under `pk`.
    #[inline]
    pub fn is_under(&self, pk: &PaillierPublicKey) -> bool {
        Arc::ptr_eq(&self.modulus, &pk.modulus) || self.modulus == pk.modulus
    }

    fn public_key(&self) -> PaillierPublicKey {
        PaillierPublicKey {
            modulus: self.modulus.clone(),
        }
    }
}

impl fmt::Debug for PaillierCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PaillierCiphertext({} bits, {}-bit key)",
            self.value.bits(),
            self.modulus.n.bits()
        )
    }
}

impl HomomorphicScheme for Paillier {
    type PublicKey = PaillierPublicKey;
    type PrivateKey = PaillierPrivateKey;
    type Ciphertext = PaillierCiphertext;

    /// Primes come from `libpaillier`'s own generator, which draws from the
    /// operating system; `rng` is not consulted.
    fn keygen<RNG: CryptoRng + RngCore>(
        &self,
        bits: usize,
        _rng: &mut RNG,
    ) -> Result<(PaillierPublicKey, PaillierPrivateKey), Error> {
        if bits < MIN_KEY_BITS {
            return Err(Error::KeyTooSmall {
                bits,
                min: MIN_KEY_BITS,
            });
        }
        for _ in 0..KEYGEN_ATTEMPTS {
            let p = BigNumber::prime(bits / 2);
            let q = BigNumber::prime(bits - bits / 2);
            let n = from_number(&p) * from_number(&q);
            if n.bits() != bits as u64 {
                continue;
            }
            let key = match DecryptionKey::with_primes(&p, &q) {
                Some(key) => key,
                None => continue,
            };
            debug!("generated {}-bit Paillier key", n.bits());
            let public = PaillierPublicKey {
                modulus: Arc::new(Modulus::new(EncryptionKey::from(&key), n)),
            };
            let private = PaillierPrivateKey {
                public: public.clone(),
                key,
            };
            return Ok((public, private));
        }
        Err(Error::KeyGenerationFailed { bits })
    }

    fn encrypt<RNG: CryptoRng + RngCore>(
        &self,
        pk: &PaillierPublicKey,
        m: &BigInt,
        rng: &mut RNG,
    ) -> Result<PaillierCiphertext, Error> {
        let m = pk.encode(m);
        if !m.is_zero() {
            return pk.encrypt_unit(&m, rng);
        }
        // libpaillier only encrypts messages in 1..n: Enc(0) = Enc(1) + Enc(n - 1).
        let one = pk.encrypt_unit(&BigUint::one(), rng)?;
        let rest = pk.encrypt_unit(&(pk.n() - 1u32), rng)?;
        pk.add_values(&one.value, &rest.value)
    }

    fn decrypt(
        &self,
        sk: &PaillierPrivateKey,
        ct: &PaillierCiphertext,
    ) -> Result<BigInt, Error> {
        if !ct.is_under(&sk.public) {
            return Err(Error::KeyMismatch);
        }
        let bytes = sk
            .key
            .decrypt(&to_number(&ct.value))
            .ok_or(Error::OperationFailed("decrypt"))?;
        Ok(sk.public.decode(BigUint::from_bytes_be(&bytes)))
    }

    fn add(
        &self,
        a: &PaillierCiphertext,
        b: &PaillierCiphertext,
    ) -> Result<PaillierCiphertext, Error> {
        if !b.is_under(&a.public_key()) {
            return Err(Error::KeyMismatch);
        }
        a.public_key().add_values(&a.value, &b.value)
    }

    fn scalar_mul(&self, ct: &PaillierCiphertext, k: &BigInt) -> Result<PaillierCiphertext, Error> {
        let pk = ct.public_key();
        let k = pk.encode(k);
        if !k.is_zero() {
            return pk.mul_value(&ct.value, &k);
        }
        // Same restriction for scalars: ct * 0 = ct * (n - 1) + ct.
        let t = pk.mul_value(&ct.value, &(pk.n() - 1u32))?;
        pk.add_values(&t.value, &ct.value)
    }
}
