mod core;

use clap::Parser;
use core::AppServerState;
use kerberos::logging::{self, info};
use kerberos::principal::PrincipalDb;
use kerberos::time::Epoch;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::thread;

/// Runs a single application server, listening on the port recorded for its
/// service principal in the shared database.
#[derive(Parser)]
#[command(name = "appserver", about = "Kerberos v4-style application server")]
struct Args {
    /// This server's service principal id (`IDv`).
    #[arg(long)]
    id: String,

    #[arg(long, default_value = "principals.toml")]
    db: PathBuf,

    #[arg(long, default_value = "epoch.txt")]
    epoch_file: PathBuf,

    #[arg(long)]
    initial_wall_clock: Option<u64>,
}

fn main() {
    let args = Args::parse();
    let log = logging::init("appserver").new(logging::o!("id_v" => args.id.clone()));

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
        Ok(db) => db,
        Err(err) => {
            eprintln!("configuration failure: {}", err);
            exit(1);
        }
    };

    let service = match db.get_service(&args.id.clone().into()) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("configuration failure: unknown service {}: {}", args.id, err);
            exit(1);
        }
    };

    let state = Arc::new(AppServerState {
        id_v: args.id.clone(),
        k_v: service.k_v,
        epoch,
        log: log.clone(),
    });

    let listener = TcpListener::bind(("0.0.0.0", service.port))
        .unwrap_or_else(|err| panic!("appserver failed to bind port {}: {}", service.port, err));

    info!(log, "appserver started"; "port" => service.port);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let state = state.clone();
                thread::spawn(move || core::handle_connection(stream, state));
            }
            Err(err) => eprintln!("accept error: {}", err),
        }
    }
}
