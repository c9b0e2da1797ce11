//! Offline principal-database setup tool. Every write to the principal
//! database happens here and nowhere else — the running servers only ever
//! read it. Random secrets are drawn from a fixed printable alphabet, and
//! each subcommand reads the existing file, mutates one record, and writes
//! the whole table back.

use clap::{Parser, Subcommand};
use kerberos::principal::{ClientRecord, PrincipalDb, ServiceRecord, TgsRecord};
use kerberos::time::timestamp_secs;
use rand::distributions::Uniform;
use rand::Rng;
use std::path::PathBuf;
use std::process::exit;

const ALLOWED_CHARS: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k',
    'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const SECRET_LEN: usize = 24;

fn random_secret() -> String {
    let range = Uniform::new(0, ALLOWED_CHARS.len());
    rand::thread_rng()
        .sample_iter(&range)
        .take(SECRET_LEN)
        .map(|idx| ALLOWED_CHARS[idx])
        .collect()
}

#[derive(Parser)]
#[command(name = "kadmin", about = "Kerberos v4-style principal database admin tool")]
struct Args {
    #[arg(long, default_value = "principals.toml")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adds a client principal; prints the generated secret if none is given.
    AddClient {
        id: String,
        #[arg(long)]
        secret: Option<String>,
    },
    /// Adds a service principal; prints the generated secret if none is given.
    AddService {
        id: String,
        port: u16,
        #[arg(long)]
        secret: Option<String>,
    },
    /// Adds the TGS shared-secret record and its default lifetimes (minutes).
    AddTgs {
        id: String,
        #[arg(long, default_value_t = 10)]
        lifetime_tgt: u64,
        #[arg(long, default_value_t = 5)]
        lifetime_st: u64,
        #[arg(long)]
        secret: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    let db = match PrincipalDb::open(&args.db) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("configuration failure: {}", err);
            exit(1);
        }
    };
    let now = timestamp_secs() / 60;

    let result = match args.command {
        Command::AddClient { id, secret } => {
            let secret = secret.unwrap_or_else(random_secret);
            println!("IDc={} K_c={}", id, secret);
            db.add_client(
                id.into(),
                ClientRecord {
                    k_c: secret,
                    created_at: now,
                },
            )
        }
        Command::AddService { id, port, secret } => {
            let secret = secret.unwrap_or_else(random_secret);
            println!("IDv={} K_v={} port={}", id, secret, port);
            db.add_service(
                id.into(),
                ServiceRecord {
                    k_v: secret,
                    port,
                    created_at: now,
                },
            )
        }
        Command::AddTgs {
            id,
            lifetime_tgt,
            lifetime_st,
            secret,
        } => {
            let secret = secret.unwrap_or_else(random_secret);
            println!("IDtgs={} K_tgs={}", id, secret);
            db.add_tgs(TgsRecord {
                id_tgs: id.into(),
                k_tgs: secret,
                default_lifetime_tgt: lifetime_tgt,
                default_lifetime_st: lifetime_st,
                created_at: now,
            })
        }
    };

    if let Err(err) = result {
        eprintln!("failed to write principal database: {}", err);
        exit(1);
    }
}
