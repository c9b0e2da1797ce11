mod core;

use clap::Parser;
use core::KdcState;
use kerberos::logging::{self, info};
use kerberos::principal::PrincipalDb;
use kerberos::time::Epoch;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::thread;

/// Runs the Authentication Server and Ticket-Granting Server concurrently in
/// one process.
#[derive(Parser)]
#[command(name = "kdc", about = "Kerberos v4-style Authentication & Ticket-Granting Server")]
struct Args {
    /// Path to the principal database (TOML).
    #[arg(long, default_value = "principals.toml")]
    db: PathBuf,

    /// Path to the shared epoch file (overrides --initial-wall-clock if both given).
    #[arg(long, default_value = "epoch.txt")]
    epoch_file: PathBuf,

    /// Overrides the shared epoch with an explicit UNIX-seconds value.
    #[arg(long)]
    initial_wall_clock: Option<u64>,

    #[arg(long, default_value_t = kerberos::DEFAULT_AS_PORT)]
    as_port: u16,

    #[arg(long, default_value_t = kerberos::DEFAULT_TGS_PORT)]
    tgs_port: u16,
}

fn main() {
    let args = Args::parse();
    let log = logging::init("kdc");

    let epoch = match args.initial_wall_clock {
        Some(secs) => Epoch::new(secs),
        None => match Epoch::load(&args.epoch_file) {
            Ok(epoch) => epoch,
            Err(err) => {
                eprintln!("configuration failure: {}", err);
                exit(1);
            }
        },
    };

    let db = match PrincipalDb::open(&args.db) {
        Ok(db) => Arc::new(db),
        Err(err) => {
            eprintln!("configuration failure: {}", err);
            exit(1);
        }
    };

    let as_state = Arc::new(KdcState {
        db: db.clone(),
        epoch,
        log: log.new(logging::o!("role" => "as")),
    });
    let tgs_state = Arc::new(KdcState {
        db,
        epoch,
        log: log.new(logging::o!("role" => "tgs")),
    });

    let as_handle = spawn_accept_loop(args.as_port, as_state, core::handle_as_connection, "AS");
    let tgs_handle = spawn_accept_loop(args.tgs_port, tgs_state, core::handle_tgs_connection, "TGS");

    info!(log, "kdc started"; "as_port" => args.as_port, "tgs_port" => args.tgs_port);

    as_handle.join().expect("AS accept loop panicked");
    tgs_handle.join().expect("TGS accept loop panicked");
}

/// Spawns one accept-loop thread; every accepted connection is dispatched to
/// its own worker thread.
fn spawn_accept_loop(
    port: u16,
    state: Arc<KdcState>,
    handler: fn(std::net::TcpStream, Arc<KdcState>),
    name: &'static str,
) -> thread::JoinHandle<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .unwrap_or_else(|err| panic!("{} failed to bind port {}: {}", name, port, err));

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let state = state.clone();
                    thread::spawn(move || handler(stream, state));
                }
                Err(err) => {
                    // A single failed accept does not bring down the loop.
                    eprintln!("{} accept error: {}", name, err);
                }
            }
        }
    })
}
