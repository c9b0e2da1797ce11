//! Writes the shared initial-epoch file (`epoch.txt`) every principal in the
//! system reads its integer-minute clock from. Initial-epoch synchronization
//! across hosts is an external concern; this binary is the minimal stand-in
//! needed to make the workspace runnable.

use clap::Parser;
use kerberos::time::{timestamp_secs, Epoch};
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser)]
#[command(name = "init_epoch", about = "Writes the shared wall-clock epoch file")]
struct Args {
    #[arg(long, default_value = "epoch.txt")]
    path: PathBuf,

    /// UNIX seconds to use as minute zero; defaults to now.
    #[arg(long)]
    unix_seconds: Option<u64>,
}

fn main() {
    let args = Args::parse();
    let epoch = Epoch::new(args.unix_seconds.unwrap_or_else(timestamp_secs));
    if let Err(err) = epoch.write(&args.path) {
        eprintln!("configuration failure: {}", err);
        exit(1);
    }
    println!("wrote epoch to {}", args.path.display());
}
