use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("courser")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("courser")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .arg(
            arg!(-s --"store-dir" <PATH>)
                .required(false)
                .help("Directory holding links.json and findings_cache.json")
                .default_value("~/.config/courser/"),
        )
        .subcommand_required(false)
        .subcommand(
            command!("sources")
                .about("Manage the registered source links that crawl-all sweeps")
                .subcommand_required(true)
                .subcommand(command!("list").about("List all registered sources"))
                .subcommand(
                    command!("add")
                        .about("Register a course homepage URL as a source")
                        .arg(arg!([URL]).required(true).help("The source homepage URL"))
                        .arg(
                            arg!(-l --"label" <LABEL>)
                                .required(false)
                                .help("Display name for the source"),
                        ),
                )
                .subcommand(
                    command!("remove")
                        .about("Deregister a source by id or URL")
                        .arg(arg!([KEY]).required(true).help("Source id or URL")),
                ),
        )
        .subcommand(
            command!("fetch")
                .about(
                    "Fetch a single page and print its plain text and links. Use this to \
                explore any URL - course homepage, syllabus page, etc.",
                )
                .arg(arg!([URL]).required(true).help("The page URL")),
        )
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a source homepage, find interesting sub-links (assignments, \
                syllabus, exams, office hours) and follow them.",
                )
                .arg(arg!([URL]).required(true).help("The source homepage URL"))
                .arg(
                    arg!(-m --"max-subpages" <N>)
                        .required(false)
                        .help("Budget of successful sub-page follows")
                        .default_value("10"),
                ),
        )
        .subcommand(
            command!("crawl-all")
                .about("Crawl every registered source and record a crawl log entry")
                .arg(
                    arg!(-m --"max-subpages" <N>)
                        .required(false)
                        .help("Budget of successful sub-page follows per source")
                        .default_value("5"),
                ),
        )
        .subcommand(
            command!("findings")
                .about("Manage curated findings extracted from crawl output")
                .subcommand_required(true)
                .subcommand(
                    command!("save")
                        .about("Merge a JSON batch of findings into the store (upsert by id)")
                        .arg(
                            arg!([JSON])
                                .required(false)
                                .help("Findings as a JSON array of objects"),
                        )
                        .arg(
                            arg!(-f --"file" <PATH>)
                                .required(false)
                                .help("Read the findings JSON from a file")
                                .conflicts_with("JSON"),
                        ),
                )
                .subcommand(
                    command!("list").about("List saved findings").arg(
                        arg!(-t --"type" <TYPE>).required(false).help(
                            "Filter by type: homework, exam, office_hours, syllabus, \
                        lecture, other",
                        ),
                    ),
                )
                .subcommand(command!("clear").about("Clear all saved findings")),
        )
}
