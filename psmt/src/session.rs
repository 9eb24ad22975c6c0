// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! The membership protocol between two parties connected by a [`Channel`].
//!
//! The server speaks first, announcing its polynomial degree. The client
//! replies with its public key and its encrypted powers, and the server
//! answers with a single blinded ciphertext.

use crate::{
    client::{Client, EncryptedPowers},
    server::{BlindedResult, Server},
    wire::WireScheme,
    Error,
};
use eyre::WrapErr;
use log::{debug, info};
use num_bigint::BigInt;
use psmt_channel::Channel;
use rand::{CryptoRng, RngCore};

/// Largest polynomial degree a client accepts from a server.
pub const MAX_DEGREE: usize = 1 << 20;

/// Answer one client query over `channel`.
pub fn serve<S, RNG>(
    server: &Server<S>,
    channel: &mut Channel<'_>,
    max_blinding_factor: u64,
    rng: &mut RNG,
) -> eyre::Result<()>
where
    S: WireScheme,
    RNG: CryptoRng + RngCore,
{
    let scheme = server.scheme();
    let degree = server.degree();
    info!("serving a query against a degree {} polynomial", degree);
    channel.write_usize(degree)?;

    let pk = scheme
        .read_public_key(channel)
        .wrap_err("receiving the client's public key")?;
    let count = channel.read_usize()?;
    if count != degree {
        return Err(Error::DegreeMismatch {
            expected: degree,
            got: count,
        }
        .into());
    }
    let powers = (0..count)
        .map(|_| scheme.read_ciphertext(channel, &pk))
        .collect::<eyre::Result<Vec<_>>>()
        .wrap_err("receiving the encrypted powers")?;
    debug!("received {} encrypted powers", count);

    let evaluation =
        server.evaluate_polynomial_homomorphically(&pk, &EncryptedPowers::new(powers), rng)?;
    let blinded = server.blind_and_return(evaluation, max_blinding_factor, rng)?;
    scheme.write_ciphertext(channel, blinded.ciphertext())?;
    channel.flush()?;
    info!("answered the query");
    Ok(())
}

/// Ask the server on the other end of `channel` whether `query` is in its
/// set, using a fresh `key_bits`-bit key pair. Returns the verdict and the
/// decrypted value.
pub fn query<S, RNG>(
    client: &mut Client<S>,
    query: &BigInt,
    key_bits: usize,
    channel: &mut Channel<'_>,
    rng: &mut RNG,
) -> eyre::Result<(bool, BigInt)>
where
    S: WireScheme,
    RNG: CryptoRng + RngCore,
{
    let degree = channel
        .read_usize()
        .wrap_err("receiving the server's polynomial degree")?;
    if degree > MAX_DEGREE {
        eyre::bail!("server announced degree {degree}, more than {MAX_DEGREE}");
    }
    info!("server announced a degree {} polynomial", degree);

    let pk = client.generate_keys(key_bits, rng)?;
    let powers = client.encrypt_query(query, degree, rng)?;
    let scheme = client.scheme();
    scheme.write_public_key(channel, &pk)?;
    channel.write_usize(powers.len())?;
    for power in powers.iter() {
        scheme.write_ciphertext(channel, power)?;
    }
    debug!("sent {} encrypted powers", powers.len());

    let blinded = scheme
        .read_ciphertext(channel, &pk)
        .wrap_err("receiving the blinded result")?;
    let decrypted = client.decrypt_result(BlindedResult::new(blinded))?;
    let is_member = client.check_membership(&decrypted);
    info!("membership verdict: {}", is_member);
    Ok((is_member, decrypted))
}
