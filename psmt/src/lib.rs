// -*- mode: rust; -*-
//
// This file is part of `psmt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.
#![deny(missing_docs)]

//! Private set-membership testing.
//!
//! A [`Server`] holds a set `S` of integers and encodes it as the monic
//! polynomial `P(x) = prod_{s in S} (x - s)`. A [`Client`] holding a query `c`
//! sends encryptions of `c, c^2, ..., c^n` under its own key for an additively
//! homomorphic scheme. The server evaluates `P` on them homomorphically,
//! multiplies by a random nonzero blinding factor, and returns the ciphertext.
//! The client learns only whether the decryption is zero, i.e. whether
//! `c in S`; the server learns nothing about `c`.
//!
//! Both parties are semi-honest. [`run_protocol`] runs them in-process;
//! [`session`] runs them over a [`psmt_channel::Channel`].

mod client;
mod errors;
mod polynomial;
mod protocol;
mod server;
pub mod session;
pub mod wire;

pub use crate::{
    client::{Client, EncryptedPowers},
    errors::Error,
    polynomial::RootPolynomial,
    protocol::{
        query_server, run_protocol, run_protocol_with, Diagnostics, ProtocolParams,
        DEFAULT_KEY_BITS,
    },
    server::{BlindedResult, EvaluationResult, Server, DEFAULT_MAX_BLINDING_FACTOR},
};

/// Marker for parties secure against semi-honest adversaries only.
pub trait SemiHonest {}
