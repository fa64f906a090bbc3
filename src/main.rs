// ABOUTME: Entry point for cipherdesk — an interactive Vigenère session supervisor.
// ABOUTME: Parses CLI args and dispatches to the orchestrator or a worker run loop.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cipherdesk::app::App;
use cipherdesk::backend::{FileLog, LocalCipher, RemoteCipher, RemoteLog, WorkerSpawner};
use cipherdesk::config::Config;
use cipherdesk::console::StdConsole;
use cipherdesk::worker;

#[derive(Parser, Debug)]
#[command(name = "cipherdesk")]
#[command(about = "Interactive Vigenère session with supervised cipher and log workers")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    /// Path of the session log file.
    logfile: Option<PathBuf>,

    /// Run the cipher and log backends in-process instead of as child workers.
    #[arg(long)]
    local: bool,

    #[command(subcommand)]
    command: Option<WorkerCommand>,
}

/// Hidden subcommands the orchestrator uses to re-invoke this executable as
/// its worker processes.
#[derive(Subcommand, Debug)]
enum WorkerCommand {
    #[command(hide = true)]
    CipherWorker,
    #[command(hide = true)]
    LogWorker { logfile: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(WorkerCommand::CipherWorker) => return worker::cipher::run().await,
        Some(WorkerCommand::LogWorker { logfile }) => {
            // Open failure is the log worker's one fatal condition; its exit
            // status distinguishes it from a normal shutdown.
            if let Err(err) = worker::log::run(&logfile).await {
                eprintln!("ERROR: cannot write log file: {err:#}");
                std::process::exit(2);
            }
            return Ok(());
        }
        None => {}
    }

    let Some(logfile) = args.logfile else {
        eprintln!("usage: cipherdesk <LOGFILE>");
        std::process::exit(1);
    };

    let config = Config::load()?;
    let grace = config.workers.shutdown_timeout();

    let mut app = if args.local {
        App::new(
            Box::new(LocalCipher::default()),
            Box::new(FileLog::open(&logfile)?),
        )
    } else {
        let mut cipher = RemoteCipher::new(WorkerSpawner, grace);
        cipher.connect().await?;
        let log = RemoteLog::spawn(&logfile, config.workers.log_queue_capacity, grace)?;
        App::new(Box::new(cipher), Box::new(log))
    };

    let mut console = StdConsole::new();
    app.run(&mut console).await
}
