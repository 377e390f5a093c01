use anyhow::Result;

use book_recommender::cli::{Cli, Command};
use book_recommender::config::AppConfig;
use book_recommender::{handle_recommend, handle_serve, handle_titles, handle_train, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;
    match &cli.command {
        Command::Train => handle_train(config),
        Command::Recommend { title, k } => handle_recommend(config, title, *k),
        Command::Titles => handle_titles(config),
        Command::Serve { port } => handle_serve(config, *port),
    }
}
