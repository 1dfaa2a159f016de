mod commands;
mod terminal;

use commands::{CommandLine, discover};
use discover_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);
    print::banner();

    let mut cfg: Config = Config::from_arg(commands.uri.as_deref());
    cfg.max_in_flight = commands.max_in_flight;

    print::header("getting ready for discovery");
    discover::discover(&cfg).await
}
