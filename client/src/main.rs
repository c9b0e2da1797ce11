use clap::Parser;
use kerberos::logging;
use kerberos::time::Epoch;
use krb_client::cache::{default_cache_dir, TicketCache};
use krb_client::{Client, ClientConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;

/// Runs one application call through the full AS → TGS → V exchange,
/// reusing cached tickets still within their lifetime.
#[derive(Parser)]
#[command(name = "client", about = "Kerberos v4-style client")]
struct Args {
    /// Application message to send to the target service.
    #[arg(long, default_value = "hi")]
    message: String,

    #[arg(long, env = "KRB_CLIENT_ID")]
    id: String,

    #[arg(long, env = "KRB_CLIENT_PASSWORD")]
    password: String,

    #[arg(long, env = "KRB_AS_ADDR", default_value = "127.0.0.1:6000")]
    as_addr: SocketAddr,

    #[arg(long, env = "KRB_TGS_ADDR", default_value = "127.0.0.1:6001")]
    tgs_addr: SocketAddr,

    #[arg(long, env = "KRB_TGS_ID", default_value = "tgs1")]
    id_tgs: String,

    #[arg(long, env = "KRB_SERVICE_ID")]
    service_id: String,

    #[arg(long, env = "KRB_SERVICE_ADDR")]
    service_addr: SocketAddr,

    #[arg(long, default_value = "epoch.txt")]
    epoch_file: PathBuf,

    #[arg(long)]
    initial_wall_clock: Option<u64>,

    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let log = logging::init("client").new(logging::o!("id_c" => args.id.clone()));

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

    let cache = match TicketCache::open(args.cache_dir.unwrap_or_else(default_cache_dir)) {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("configuration failure: {}", err);
            exit(1);
        }
    };

    let config = ClientConfig {
        id_c: args.id.into(),
        password: args.password,
        as_addr: args.as_addr,
        tgs_addr: args.tgs_addr,
        id_tgs: args.id_tgs.into(),
    };
    let client = Client::new(config, cache, epoch, log);

    match client.call_service(&args.service_id.into(), args.service_addr, &args.message) {
        Ok(ack) => {
            println!("{}", ack);
        }
        Err(err) => {
            eprintln!("request failed: {}", err);
            exit(1);
        }
    }
}
