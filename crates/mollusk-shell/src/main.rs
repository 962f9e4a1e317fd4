//! mollusk shell binary.
//!
//! Usage:
//!   # Play with the default config (~/.config/mollusk/config.ron)
//!   cargo run -p mollusk-shell
//!
//!   # Separate save files and a 4 KiB disk
//!   cargo run -p mollusk-shell -- --state saves/fs.json --cache saves/cache.json --capacity 4096
//!
//! Logs go to stderr; set `RUST_LOG=mollusk_shell=debug` for more.

use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use mollusk_shell::{Shell, ShellConfig};

/// A tiny shell over a capacity-bounded virtual filesystem.
#[derive(Parser, Debug)]
#[command(name = "mollusk")]
#[command(about = "Play in a capacity-bounded virtual filesystem")]
struct Args {
    /// Config file (defaults to ~/.config/mollusk/config.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Filesystem save file
    #[arg(long)]
    state: Option<PathBuf>,

    /// Cache save file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Player name
    #[arg(short, long)]
    user: Option<String>,

    /// Byte budget of the home filesystem
    #[arg(long)]
    capacity: Option<usize>,
}

impl Args {
    fn apply(&self, config: &mut ShellConfig) {
        if let Some(state) = &self.state {
            config.state_path = state.clone();
        }
        if let Some(cache) = &self.cache {
            config.cache_path = cache.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if self.capacity.is_some() {
            config.capacity = self.capacity;
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let mut config = ShellConfig::load_or_default(args.config.as_deref());
    args.apply(&mut config);

    let mut shell = Shell::load(config);
    if let Some(capacity) = args.capacity {
        // A saved filesystem keeps its own budget unless overridden here.
        if let Err(e) = shell.host_mut().home_mut().set_capacity(Some(capacity)) {
            tracing::warn!("cannot apply --capacity {capacity}: {e}");
        }
    }
    tracing::info!(user = %shell.config().user, host = %shell.host().name(), "session started");

    // Shutdown runs whatever the loop returned.
    let session = shell.run(&mut io::stdin().lock(), &mut io::stdout());
    if let Err(e) = &session {
        tracing::error!("session ended abnormally: {e}");
    }
    shell.shutdown()?;
    tracing::info!("session ended");
    Ok(session?)
}
