pub mod discover;

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "discover")]
#[command(about = "Find hosts on the local subnet listening on a TCP port.")]
#[command(version)]
pub struct CommandLine {
    /// Optional invocation URI, e.g. discover://_?port=3000&serve=true&apiPort=7370
    pub uri: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors; results are still printed
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Cap the number of probes in flight (default: one per address)
    #[arg(long)]
    pub max_in_flight: Option<usize>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
