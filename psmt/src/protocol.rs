// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! Running both parties of the membership protocol in one process.

use crate::{
    client::Client,
    server::{Server, DEFAULT_MAX_BLINDING_FACTOR},
    Error,
};
use homomorphic::{HomomorphicScheme, Paillier};
use log::{debug, warn};
use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};
use serde::{Serialize, Serializer};

/// Default modulus size of the client's key pair.
pub const DEFAULT_KEY_BITS: usize = 1024;

/// Parameters of one protocol run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolParams {
    /// Modulus size of the client's key pair.
    pub key_bits: usize,
    /// Inclusive upper bound on the server's blinding factor.
    pub max_blinding_factor: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        ProtocolParams {
            key_bits: DEFAULT_KEY_BITS,
            max_blinding_factor: DEFAULT_MAX_BLINDING_FACTOR,
        }
    }
}

/// What happened during one run. Integers serialize as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// The client's query.
    #[serde(serialize_with = "as_decimal")]
    pub query: BigInt,
    /// Size of the dataset as given, before duplicates were removed.
    pub dataset_size: usize,
    /// Degree of the server's polynomial.
    pub polynomial_degree: usize,
    /// Coefficients of the server's polynomial, leading first.
    #[serde(serialize_with = "as_decimals")]
    pub coefficients: Vec<BigInt>,
    /// What the client decrypted.
    #[serde(serialize_with = "as_decimal")]
    pub decrypted_result: BigInt,
    /// The protocol's verdict.
    pub is_member: bool,
    /// Whether the query is actually in the dataset.
    pub actual_membership: bool,
}

fn as_decimal<S: Serializer>(x: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(x)
}

#[allow(clippy::ptr_arg)]
fn as_decimals<S: Serializer>(xs: &Vec<BigInt>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(xs.iter().map(|x| x.to_string()))
}

/// Run a fresh client with `query` against `server`: keygen, encrypt powers,
/// evaluate, blind, decrypt. Returns the verdict and the decrypted value.
///
/// Only takes `&Server`, so many queries may run against one server at once.
pub fn query_server<S, RNG>(
    server: &Server<S>,
    query: &BigInt,
    params: &ProtocolParams,
    rng: &mut RNG,
) -> Result<(bool, BigInt), Error>
where
    S: HomomorphicScheme + Clone,
    RNG: CryptoRng + RngCore,
{
    let mut client = Client::new(server.scheme().clone());
    let pk = client.generate_keys(params.key_bits, rng)?;
    let powers = client.encrypt_query(query, server.degree(), rng)?;
    let evaluation = server.evaluate_polynomial_homomorphically(&pk, &powers, rng)?;
    let blinded = server.blind_and_return(evaluation, params.max_blinding_factor, rng)?;
    let decrypted = client.decrypt_result(blinded)?;
    Ok((client.check_membership(&decrypted), decrypted))
}

/// Run the whole protocol in-process with an arbitrary scheme.
///
/// The verdict is exact as long as the blinded value `r * P(query)` fits in
/// the scheme's plaintext space; beyond that a non-member may wrap around to
/// zero. The result is compared with direct membership and a disagreement is
/// logged.
pub fn run_protocol_with<S, RNG>(
    scheme: S,
    query: &BigInt,
    dataset: &[BigInt],
    params: &ProtocolParams,
    rng: &mut RNG,
) -> Result<(bool, Diagnostics), Error>
where
    S: HomomorphicScheme + Clone,
    RNG: CryptoRng + RngCore,
{
    let server = Server::new(scheme, dataset.iter().cloned());
    let (is_member, decrypted) = query_server(&server, query, params, rng)?;
    let actual_membership = dataset.contains(query);
    if is_member != actual_membership {
        warn!(
            "protocol verdict {} disagrees with actual membership {} for query {}",
            is_member, actual_membership, query
        );
    }
    debug!("protocol run complete: member = {}", is_member);
    let diagnostics = Diagnostics {
        query: query.clone(),
        dataset_size: dataset.len(),
        polynomial_degree: server.degree(),
        coefficients: server.coefficients().to_vec(),
        decrypted_result: decrypted,
        is_member,
        actual_membership,
    };
    Ok((is_member, diagnostics))
}

/// Run the whole protocol in-process with Paillier keys of `key_bits` bits,
/// the default blinding bound and the thread-local RNG.
pub fn run_protocol(
    query: &BigInt,
    dataset: &[BigInt],
    key_bits: usize,
) -> Result<(bool, Diagnostics), Error> {
    let params = ProtocolParams {
        key_bits,
        ..ProtocolParams::default()
    };
    run_protocol_with(Paillier, query, dataset, &params, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homomorphic::PlaintextScheme;
    use num_traits::Zero;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ints(xs: impl IntoIterator<Item = i64>) -> Vec<BigInt> {
        xs.into_iter().map(BigInt::from).collect()
    }

    fn paillier_run(query: i64, dataset: &[BigInt], seed: u64) -> (bool, Diagnostics) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        run_protocol_with(
            Paillier,
            &BigInt::from(query),
            dataset,
            &ProtocolParams::default(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_member_decrypts_to_zero() {
        let (member, diag) = paillier_run(5, &ints([1, 3, 5, 7, 9]), 0);
        assert!(member);
        assert!(diag.actual_membership);
        assert!(diag.decrypted_result.is_zero());
        assert_eq!(diag.polynomial_degree, 5);
        assert_eq!(diag.coefficients.len(), 6);
    }

    #[test]
    fn test_non_member_decrypts_to_nonzero() {
        let (member, diag) = paillier_run(4, &ints([1, 3, 5, 7, 9]), 1);
        assert!(!member);
        assert!(!diag.actual_membership);
        assert!(!diag.decrypted_result.is_zero());
    }

    #[test]
    fn test_member_of_range() {
        let (member, _) = paillier_run(15, &ints(10..=20), 2);
        assert!(member);
    }

    #[test]
    fn test_far_non_member_of_large_set() {
        let (member, diag) = paillier_run(150, &ints(1..=100), 3);
        assert!(!member);
        assert_eq!(diag.polynomial_degree, 100);
        assert!(!diag.actual_membership);
    }

    #[test]
    fn test_singleton() {
        assert!(paillier_run(42, &ints([42]), 4).0);
        assert!(!paillier_run(43, &ints([42]), 5).0);
    }

    #[test]
    fn test_empty_dataset() {
        let (member, diag) = paillier_run(7, &[], 6);
        assert!(!member);
        assert_eq!(diag.polynomial_degree, 0);
        assert_eq!(diag.coefficients, ints([1]));
        assert!(!diag.decrypted_result.is_zero());
    }

    #[test]
    fn test_negative_members() {
        let (member, _) = paillier_run(-8, &ints([-8, 0, 8]), 7);
        assert!(member);
        let (member, _) = paillier_run(-7, &ints([-8, 0, 8]), 8);
        assert!(!member);
    }

    #[test]
    fn test_run_protocol_uses_thread_rng() {
        let (member, diag) = run_protocol(&BigInt::from(3), &ints([1, 2, 3]), 512).unwrap();
        assert!(member);
        assert_eq!(diag.query, BigInt::from(3));
    }

    #[test]
    fn test_dataset_size_counts_duplicates() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let (member, diag) = run_protocol_with(
            PlaintextScheme,
            &BigInt::from(2),
            &ints([2, 2, 4, 4, 4]),
            &ProtocolParams::default(),
            &mut rng,
        )
        .unwrap();
        assert!(member);
        assert_eq!(diag.dataset_size, 5);
        assert_eq!(diag.polynomial_degree, 2);
    }

    #[test]
    fn test_plaintext_scheme_sees_blinded_value() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let params = ProtocolParams {
            key_bits: 1024,
            max_blinding_factor: 1,
        };
        let (member, diag) = run_protocol_with(
            PlaintextScheme,
            &BigInt::from(4),
            &ints([1, 3, 5, 7, 9]),
            &params,
            &mut rng,
        )
        .unwrap();
        assert!(!member);
        // With r fixed at 1 the client sees P(4) = 3 * 1 * (-1) * (-3) * (-5).
        assert_eq!(diag.decrypted_result, BigInt::from(-45));
    }

    #[test]
    fn test_non_member_answers_differ_between_runs() {
        let dataset = ints([1, 3, 5, 7, 9]);
        let params = ProtocolParams {
            key_bits: 512,
            max_blinding_factor: DEFAULT_MAX_BLINDING_FACTOR,
        };
        let answers = (0..4u64)
            .map(|seed| {
                let mut rng = ChaCha20Rng::seed_from_u64(100 + seed);
                let (member, diag) =
                    run_protocol_with(Paillier, &BigInt::from(4), &dataset, &params, &mut rng)
                        .unwrap();
                assert!(!member);
                // Every answer is r * P(4) = r * -45 for some r in 1..=1000.
                assert!((&diag.decrypted_result % BigInt::from(45)).is_zero());
                diag.decrypted_result
            })
            .collect::<Vec<_>>();
        assert!(answers.iter().any(|a| a != &answers[0]));
    }

    #[test]
    fn test_zero_blinding_bound_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let params = ProtocolParams {
            key_bits: 1024,
            max_blinding_factor: 0,
        };
        let err = run_protocol_with(PlaintextScheme, &BigInt::from(1), &ints([1]), &params, &mut rng)
            .unwrap_err();
        assert_eq!(err, Error::InvalidBlindingFactor(0));
    }

    #[test]
    fn test_key_too_small_surfaces_as_scheme_error() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let params = ProtocolParams {
            key_bits: 64,
            max_blinding_factor: 1000,
        };
        let err = run_protocol_with(Paillier, &BigInt::from(1), &ints([1]), &params, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SchemeError(homomorphic::Error::KeyTooSmall { .. })
        ));
    }

    #[test]
    fn test_concurrent_queries_share_a_server() {
        let server = Server::new(Paillier, 1..=20);
        let params = ProtocolParams {
            key_bits: 512,
            max_blinding_factor: 1000,
        };
        let verdicts = std::thread::scope(|scope| {
            let handles = (15..=30)
                .map(|q| {
                    let server = &server;
                    let params = &params;
                    scope.spawn(move || {
                        let mut rng = ChaCha20Rng::seed_from_u64(q as u64);
                        let (member, _) =
                            query_server(server, &BigInt::from(q), params, &mut rng).unwrap();
                        (q, member)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });
        for (q, member) in verdicts {
            assert_eq!(member, q <= 20, "query {}", q);
        }
    }

    #[test]
    fn test_diagnostics_serialize_integers_as_strings() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let (_, diag) = run_protocol_with(
            PlaintextScheme,
            &BigInt::from(-1),
            &ints([2]),
            &ProtocolParams {
                key_bits: 1024,
                max_blinding_factor: 1,
            },
            &mut rng,
        )
        .unwrap();
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["query"], "-1");
        assert_eq!(json["coefficients"], serde_json::json!(["1", "-2"]));
        assert_eq!(json["decrypted_result"], "-3");
        assert_eq!(json["dataset_size"], 1);
        assert_eq!(json["is_member"], false);
        assert_eq!(json["actual_membership"], false);
    }
}
