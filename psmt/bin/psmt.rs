mod cli;

use clap::Parser;
use cli::{Cli, Command};
use eyre::{Result, WrapErr};
use homomorphic::Paillier;
use log::info;
use num_bigint::BigInt;
use psmt::{session, Client, ProtocolParams, Server};
use psmt_channel::Channel;
use std::env;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

const CONNECT_ATTEMPTS: usize = 100;
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);

fn print_verdict(query: &BigInt, is_member: bool) {
    if is_member {
        println!("{} is a member", query);
    } else {
        println!("{} is not a member", query);
    }
}

fn connect(addr: &str) -> Result<TcpStream> {
    let mut attempt = 0;
    loop {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt + 1 < CONNECT_ATTEMPTS => {
                info!("couldn't connect to {}: {:?}", addr, e);
                attempt += 1;
                thread::sleep(CONNECT_BACKOFF);
            }
            Err(e) => return Err(e).wrap_err_with(|| format!("connecting to {addr}")),
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut rng = rand::thread_rng();
    match &cli.command {
        Command::Run {
            query,
            dataset,
            key_bits,
            max_blinding_factor,
            json,
        } => {
            let params = ProtocolParams {
                key_bits: *key_bits,
                max_blinding_factor: *max_blinding_factor,
            };
            let start = Instant::now();
            let (is_member, diagnostics) =
                psmt::run_protocol_with(Paillier, query, dataset, &params, &mut rng)?;
            info!("time protocol: {:?}", start.elapsed());
            if *json {
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
            } else {
                print_verdict(query, is_member);
            }
        }
        Command::Serve {
            dataset,
            connection_addr,
            max_blinding_factor,
        } => {
            let server = Server::new(Paillier, dataset.iter().cloned());
            info!("addr: {:?}", connection_addr);
            let listener = TcpListener::bind(connection_addr)
                .wrap_err_with(|| format!("binding {connection_addr}"))?;
            let (stream, addr) = listener.accept().wrap_err("accepting a client")?;
            info!("connection received from {}", addr);
            let start = Instant::now();
            Channel::with(stream, |channel| {
                session::serve(&server, channel, *max_blinding_factor, &mut rng)
            })?;
            info!("time serve: {:?}", start.elapsed());
        }
        Command::Query {
            query,
            connection_addr,
            key_bits,
        } => {
            info!("addr: {:?}", connection_addr);
            let stream = connect(connection_addr)?;
            let start = Instant::now();
            let mut client = Client::new(Paillier);
            let (is_member, _) = Channel::with(stream, |channel| {
                session::query(&mut client, query, *key_bits, channel, &mut rng)
            })?;
            info!("time query: {:?}", start.elapsed());
            print_verdict(query, is_member);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // if log-level `RUST_LOG` not already set, then set to info
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    pretty_env_logger::init_timed();

    let cli = Cli::parse();

    run(&cli)
}
