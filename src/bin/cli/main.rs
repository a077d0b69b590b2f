use std::env;

use anyhow::Result;
use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

use olrecord::{
    config::Config,
    sketch::{sketch, SortKeys},
    Client, Fetch,
};

mod command_parser;

fn olid(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("olid")
        .map(String::as_str)
        .unwrap_or(command_parser::DEFAULT_OLID)
}

fn run_work(olid: &str, hydrate: bool, client: &Client) -> Result<()> {
    let mut work = client.fetch_work(olid)?;
    println!("{work:#?}");
    if hydrate {
        println!("\nLazy loading {} authors...\n", work.authors.len());
        work.hydrate_authors(client)?;
        println!("{work:#?}");

        println!("\nLazy loading {} languages...\n", work.languages.len());
        work.hydrate_languages(client)?;
        println!("{work:#?}");
    }
    Ok(())
}

fn handle_command(matches: &ArgMatches, client: &Client) -> Result<()> {
    match matches.subcommand() {
        Some(("schema", matches)) => {
            let data = client.fetch(olid(matches))?;
            let sort = if matches.get_flag("unsorted") {
                SortKeys::No
            } else {
                SortKeys::Yes
            };
            print!("{}", sketch("Work", &data, sort));
        }
        Some(("work", matches)) => run_work(olid(matches), matches.get_flag("hydrate"), client)?,
        Some(("fetch", matches)) => {
            let data = client.fetch(olid(matches))?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Some(("config", _)) => {
            print!("{}", Config::default_as_string()?);
        }
        Some((name, _)) => unimplemented!("{}", name),
        None => run_work(command_parser::DEFAULT_OLID, true, client)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = command_parser::arg_parser_cli().get_matches_from(env::args_os());
    let config = Config::read_config()?;
    let client = Client::new(&config)?;

    handle_command(&matches, &client)
}
