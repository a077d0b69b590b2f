use clap::{Arg, ArgAction, Command};

pub const DEFAULT_OLID: &str = "isbn/0140328726";

fn olid_arg() -> Arg {
    Arg::new("olid")
        .help("Open Library id, e.g. isbn/0140328726 or /authors/OL34184A")
        .default_value(DEFAULT_OLID)
}

pub fn arg_parser_cli() -> Command {
    Command::new("olrecord")
        .about("Fetch and inspect Open Library records")
        .after_help("Without a subcommand, runs `work isbn/0140328726 --hydrate`.")
        .subcommand(
            Command::new("schema")
                .about("Print a pseudo-struct inferred from a fetched record")
                .arg(olid_arg())
                .arg(
                    Arg::new("unsorted")
                        .long("unsorted")
                        .help("Keep keys in response order")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("work")
                .about("Fetch an edition and print it as a Work")
                .arg(olid_arg())
                .arg(
                    Arg::new("hydrate")
                        .long("hydrate")
                        .help("Lazy load the referenced authors and languages")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("Print the raw JSON of a record")
                .arg(olid_arg()),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
}
