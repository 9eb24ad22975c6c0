/*!
Cli utilities.

*/
use clap::{Parser, Subcommand};
use num_bigint::BigInt;
use psmt::{DEFAULT_KEY_BITS, DEFAULT_MAX_BLINDING_FACTOR};

const DEFAULT_ADDR: &str = "127.0.0.1:5527";

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run both parties in this process
    Run {
        /// The client's query
        #[clap(long, allow_hyphen_values = true)]
        query: BigInt,

        /// The server's dataset, comma separated
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        dataset: Vec<BigInt>,

        /// Size of the client's key in bits
        #[clap(default_value_t = DEFAULT_KEY_BITS, long)]
        key_bits: usize,

        /// Inclusive upper bound on the blinding factor
        #[clap(default_value_t = DEFAULT_MAX_BLINDING_FACTOR, long)]
        max_blinding_factor: u64,

        /// Print the run's diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Act as the server and answer a single query
    Serve {
        /// The server's dataset, comma separated
        #[clap(long, value_delimiter = ',', allow_hyphen_values = true)]
        dataset: Vec<BigInt>,

        /// Set addr for tcp connection
        #[clap(default_value_t = DEFAULT_ADDR.to_string(), short, long)]
        connection_addr: String,

        /// Inclusive upper bound on the blinding factor
        #[clap(default_value_t = DEFAULT_MAX_BLINDING_FACTOR, long)]
        max_blinding_factor: u64,
    },
    /// Act as the client and query a running server
    Query {
        /// The client's query
        #[clap(long, allow_hyphen_values = true)]
        query: BigInt,

        /// Set addr for tcp connection
        #[clap(default_value_t = DEFAULT_ADDR.to_string(), short, long)]
        connection_addr: String,

        /// Size of the client's key in bits
        #[clap(default_value_t = DEFAULT_KEY_BITS, long)]
        key_bits: usize,
    },
}

/// Cli.
#[derive(Parser)]
#[clap(name = "psmt")]
#[clap(author = "swanky authors <swanky@galois.com>")]
#[clap(version = "0.1")]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}
