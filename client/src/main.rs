mod config;
mod input;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use common::config::Validate;
use common::games::SessionRng;
use common::games::ultimate::{ChannelTransport, GameMode, MatchController, MatchSession, SessionCommand};
use common::{log, logger};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use config::{default_config_path, get_config_manager};
use input::{HELP, Input, parse_input};
use terminal::TerminalBroadcaster;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Local,
    Ai,
}

#[derive(Parser)]
#[command(name = "ultimate_ttt_client")]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Ai)]
    mode: Mode,

    /// Seed for the bot's random choices; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the configured search depth.
    #[arg(long)]
    depth: Option<usize>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = get_config_manager(config_path).get_config()?;
    if let Some(depth) = args.depth {
        config.bot.depth_limit = depth;
    }
    config.validate()?;

    let prefix = if args.use_log_prefix {
        Some(config.log_prefix.clone().unwrap_or_else(|| "Client".to_string()))
    } else {
        None
    };
    logger::init_logger(prefix);

    let rng = match args.seed {
        Some(seed) => SessionRng::new(seed),
        None => SessionRng::from_random(),
    };
    log!("Starting {:?} game with seed {}", args.mode, rng.seed());

    let mode = match args.mode {
        Mode::Local => GameMode::Local,
        Mode::Ai => GameMode::Ai {
            ai_mark: config.ai_mark,
        },
    };
    let controller = MatchController::new(mode, config.bot, rng);
    let session = MatchSession::<_, ChannelTransport>::new(controller, TerminalBroadcaster::new(), None);

    let (command_tx, command_rx) = mpsc::channel(16);
    let session_handle = tokio::spawn(session.run(command_rx, None));

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line, config.ai_mark) {
            Ok(Input::Help) => println!("{}", HELP),
            Ok(Input::Command(command)) => {
                let is_shutdown = command == SessionCommand::Shutdown;
                if command_tx.send(command).await.is_err() || is_shutdown {
                    break;
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    drop(command_tx);
    let last = session_handle.await?;
    log!(
        "Session finished with {} moves, result {:?}",
        last.state.move_log().len(),
        last.state.result()
    );

    Ok(())
}
