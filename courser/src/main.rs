use courser::commands::command_argument_builder;
use courser::handlers;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();
    let quiet = matches.get_flag("quiet");

    if !quiet {
        courser_core::print_banner();
    }

    // Logs go to stderr; stdout carries only the JSON answer.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let store_dir =
        handlers::resolve_store_dir(matches.get_one::<String>("store-dir").expect("has default"));

    let outcome = match matches.subcommand() {
        Some(("sources", sub)) => match sub.subcommand() {
            Some(("list", _)) => handlers::handle_sources_list(&store_dir),
            Some(("add", args)) => handlers::handle_sources_add(&store_dir, args),
            Some(("remove", args)) => handlers::handle_sources_remove(&store_dir, args),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("fetch", args)) => handlers::handle_fetch(args).await,
        Some(("crawl", args)) => handlers::handle_crawl(args, quiet).await,
        Some(("crawl-all", args)) => handlers::handle_crawl_all(&store_dir, args, quiet).await,
        Some(("findings", sub)) => match sub.subcommand() {
            Some(("save", args)) => handlers::handle_findings_save(&store_dir, args),
            Some(("list", args)) => handlers::handle_findings_list(&store_dir, args),
            Some(("clear", _)) => handlers::handle_findings_clear(&store_dir),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        // No subcommand provided, just show the banner
        None => Ok(()),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}
