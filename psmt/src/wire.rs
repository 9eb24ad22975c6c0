// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! How keys and ciphertexts of each scheme travel over a [`Channel`].

use homomorphic::{
    HomomorphicScheme, Paillier, PaillierCiphertext, PaillierPublicKey, PlaintextCiphertext,
    PlaintextKey, PlaintextScheme,
};
use psmt_channel::Channel;

/// A [`HomomorphicScheme`] whose public keys and ciphertexts can be sent to
/// the peer.
pub trait WireScheme: HomomorphicScheme {
    /// Send a public key.
    fn write_public_key(&self, channel: &mut Channel<'_>, pk: &Self::PublicKey)
        -> eyre::Result<()>;

    /// Receive a public key, validating it.
    fn read_public_key(&self, channel: &mut Channel<'_>) -> eyre::Result<Self::PublicKey>;

    /// Send a ciphertext.
    fn write_ciphertext(
        &self,
        channel: &mut Channel<'_>,
        ct: &Self::Ciphertext,
    ) -> eyre::Result<()>;

    /// Receive a ciphertext under `pk`, validating it.
    fn read_ciphertext(
        &self,
        channel: &mut Channel<'_>,
        pk: &Self::PublicKey,
    ) -> eyre::Result<Self::Ciphertext>;
}

impl WireScheme for Paillier {
    fn write_public_key(
        &self,
        channel: &mut Channel<'_>,
        pk: &PaillierPublicKey,
    ) -> eyre::Result<()> {
        channel.write_biguint(pk.n())
    }

    fn read_public_key(&self, channel: &mut Channel<'_>) -> eyre::Result<PaillierPublicKey> {
        let n = channel.read_biguint()?;
        Ok(PaillierPublicKey::from_modulus(n)?)
    }

    fn write_ciphertext(
        &self,
        channel: &mut Channel<'_>,
        ct: &PaillierCiphertext,
    ) -> eyre::Result<()> {
        channel.write_biguint(ct.value())
    }

    fn read_ciphertext(
        &self,
        channel: &mut Channel<'_>,
        pk: &PaillierPublicKey,
    ) -> eyre::Result<PaillierCiphertext> {
        let value = channel.read_biguint()?;
        Ok(pk.ciphertext_from_value(value)?)
    }
}

impl WireScheme for PlaintextScheme {
    fn write_public_key(&self, channel: &mut Channel<'_>, pk: &PlaintextKey) -> eyre::Result<()> {
        channel.write_usize(pk.bits())
    }

    fn read_public_key(&self, channel: &mut Channel<'_>) -> eyre::Result<PlaintextKey> {
        Ok(PlaintextKey::new(channel.read_usize()?))
    }

    fn write_ciphertext(
        &self,
        channel: &mut Channel<'_>,
        ct: &PlaintextCiphertext,
    ) -> eyre::Result<()> {
        channel.write_bigint(ct.value())
    }

    fn read_ciphertext(
        &self,
        channel: &mut Channel<'_>,
        _pk: &PlaintextKey,
    ) -> eyre::Result<PlaintextCiphertext> {
        Ok(PlaintextCiphertext::new(channel.read_bigint()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::{BigInt, BigUint};
    use psmt_channel::local::local_channel_pair;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_paillier_key_and_ciphertext_cross_the_wire() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let (pk, sk) = Paillier.keygen(256, &mut rng).unwrap();
        let ct = Paillier.encrypt(&pk, &BigInt::from(-77), &mut rng).unwrap();
        let (decrypted, ()) = local_channel_pair(
            |channel| {
                let pk = Paillier.read_public_key(channel)?;
                let ct = Paillier.read_ciphertext(channel, &pk)?;
                Ok(Paillier.decrypt(&sk, &ct)?)
            },
            |channel| {
                Paillier.write_public_key(channel, &pk)?;
                Paillier.write_ciphertext(channel, &ct)
            },
        )
        .unwrap();
        assert_eq!(decrypted, BigInt::from(-77));
    }

    #[test]
    fn test_paillier_rejects_bad_values() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (pk, _) = Paillier.keygen(256, &mut rng).unwrap();
        let n_squared = pk.n() * pk.n();
        let (result, ()) = local_channel_pair(
            |channel| {
                let pk = Paillier.read_public_key(channel)?;
                Ok(Paillier.read_ciphertext(channel, &pk).is_err())
            },
            |channel| {
                Paillier.write_public_key(channel, &pk)?;
                channel.write_biguint(&n_squared)
            },
        )
        .unwrap();
        assert!(result);

        let (result, ()) = local_channel_pair(
            |channel| Ok(Paillier.read_public_key(channel).is_err()),
            |channel| channel.write_biguint(&BigUint::from(1u32 << 20)),
        )
        .unwrap();
        assert!(result);
    }

    #[test]
    fn test_plaintext_scheme_cross_the_wire() {
        let (received, ()) = local_channel_pair(
            |channel| {
                let pk = PlaintextScheme.read_public_key(channel)?;
                let ct = PlaintextScheme.read_ciphertext(channel, &pk)?;
                Ok((pk, ct))
            },
            |channel| {
                PlaintextScheme.write_public_key(channel, &PlaintextKey::new(2048))?;
                PlaintextScheme
                    .write_ciphertext(channel, &PlaintextCiphertext::new(BigInt::from(-5)))
            },
        )
        .unwrap();
        assert_eq!(
            received,
            (
                PlaintextKey::new(2048),
                PlaintextCiphertext::new(BigInt::from(-5))
            )
        );
    }
}
