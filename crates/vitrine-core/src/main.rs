use clap::{Parser, Subcommand};
use std::io::Write;
use std::os::unix::net::UnixStream;
use vitrine_core::ipc::{Command, SOCKET_PATH};

#[derive(Parser, Debug)]
#[command(name = "vitrinectl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show the vitrine window
    Show,
    /// Hide the vitrine window
    Hide,
    /// Turn to the next panel
    Next,
    /// Turn to the previous panel
    Prev,
    /// Turn to a panel by its 0-based position
    Face { index: usize },
    /// Center a gallery photo by its 0-based position
    Slide { index: usize },
    /// Write the default config file (if missing) and open it
    Setup,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Command::Show,
            Commands::Hide => Command::Hide,
            Commands::Next => Command::Next,
            Commands::Prev => Command::Prev,
            Commands::Face { index } => Command::Face(index),
            Commands::Slide { index } => Command::Slide(index),
            Commands::Setup => Command::Setup,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    send_command(Command::from(cli.command))
}

fn send_command(command: Command) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to vitrine at {}: {}. Is vitrine running?",
            SOCKET_PATH,
            e
        )
    })?;

    log::debug!("sending '{}'", command);
    writeln!(stream, "{}", command)?;
    Ok(())
}
