use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use courser_core::coerce;
use courser_core::findings::{FindingType, FindingsStore};
use courser_core::report::generate_sweep_report;
use courser_core::sources::SourceRegistry;
use courser_core::store::JsonFileStore;
use courser_core::sweep::crawl_all_sources;
use courser_core::CoreError;
use courser_crawler::Crawler;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const LINKS_FILE: &str = "links.json";
pub const CACHE_FILE: &str = "findings_cache.json";

/// Expand `~` in the store directory argument.
pub fn resolve_store_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Parse a URL argument from the transport, unwrapping JSON containers and
/// trying an `http://` prefix for bare hostnames.
pub fn normalize_url(raw: &str) -> Option<String> {
    let candidate = coerce::url_arg(raw);
    if Url::parse(&candidate).is_ok() {
        return Some(candidate);
    }
    let with_scheme = format!("http://{}", candidate);
    Url::parse(&with_scheme).ok().map(|_| with_scheme)
}

pub fn open_registry(store_dir: &Path) -> SourceRegistry<JsonFileStore> {
    SourceRegistry::new(JsonFileStore::new(store_dir.join(LINKS_FILE)))
}

pub fn open_findings(store_dir: &Path) -> FindingsStore<JsonFileStore> {
    FindingsStore::new(JsonFileStore::new(store_dir.join(CACHE_FILE)))
}

/// Every operation answers on stdout with one pretty-printed JSON document;
/// progress and reports go to stderr.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn crawl_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting crawl...");
    Some(pb)
}

fn crawler_with_spinner(spinner: &Option<ProgressBar>) -> Crawler {
    match spinner {
        Some(pb) => {
            let pb = pb.clone();
            Crawler::new().with_progress_callback(Arc::new(move |url: &str| {
                pb.set_message(url.to_string());
            }))
        }
        None => Crawler::new(),
    }
}

// Handler functions

pub fn handle_sources_list(store_dir: &Path) -> anyhow::Result<()> {
    let sources = open_registry(store_dir).list()?;
    print_json(&sources)
}

pub fn handle_sources_add(store_dir: &Path, args: &ArgMatches) -> anyhow::Result<()> {
    let raw = args.get_one::<String>("URL").unwrap();
    let label = args.get_one::<String>("label").map(String::as_str);

    let Some(url) = normalize_url(raw) else {
        return print_json(&json!({"error": format!("invalid url: {}", raw)}));
    };

    match open_registry(store_dir).add(&url, label) {
        Ok(sources) => print_json(&sources),
        Err(e @ CoreError::Validation(_)) => print_json(&json!({"error": e.to_string()})),
        Err(e) => Err(e.into()),
    }
}

pub fn handle_sources_remove(store_dir: &Path, args: &ArgMatches) -> anyhow::Result<()> {
    let key = coerce::url_arg(args.get_one::<String>("KEY").unwrap());

    match open_registry(store_dir).remove(&key) {
        Ok(sources) => print_json(&sources),
        Err(e @ CoreError::NotFound(_)) => print_json(&json!({"error": e.to_string()})),
        Err(e) => Err(e.into()),
    }
}

pub async fn handle_fetch(args: &ArgMatches) -> anyhow::Result<()> {
    let raw = args.get_one::<String>("URL").unwrap();
    let url = normalize_url(raw).unwrap_or_else(|| coerce::url_arg(raw));

    let capture = Crawler::new().fetch_page(&url).await;
    print_json(&capture)
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let raw = args.get_one::<String>("URL").unwrap();
    let url = normalize_url(raw).unwrap_or_else(|| coerce::url_arg(raw));
    let max_subpages = coerce::int_arg(args.get_one::<String>("max-subpages").unwrap(), 10);

    let spinner = crawl_spinner(quiet);
    let result = crawler_with_spinner(&spinner).crawl(&url, max_subpages).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    print_json(&result)
}

pub async fn handle_crawl_all(
    store_dir: &Path,
    args: &ArgMatches,
    quiet: bool,
) -> anyhow::Result<()> {
    let max_subpages = coerce::int_arg(args.get_one::<String>("max-subpages").unwrap(), 5);
    let registry = open_registry(store_dir);
    let findings = open_findings(store_dir);

    let spinner = crawl_spinner(quiet);
    let crawler = crawler_with_spinner(&spinner);
    let outcome = crawl_all_sources(&registry, &findings, &crawler, max_subpages).await?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    print_json(&outcome)?;

    if !quiet {
        eprintln!("{}", "✓ Sweep complete".green().bold());
        eprintln!("{}", generate_sweep_report(&outcome));
    }
    Ok(())
}

pub fn handle_findings_save(store_dir: &Path, args: &ArgMatches) -> anyhow::Result<()> {
    let raw = match args.get_one::<String>("file") {
        Some(path) => {
            let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
            std::fs::read_to_string(&expanded)
                .with_context(|| format!("failed to read findings file {}", path))?
        }
        None => args.get_one::<String>("JSON").cloned().unwrap_or_default(),
    };

    match coerce::coerce_findings(&raw) {
        Ok(drafts) => {
            let outcome = open_findings(store_dir).save(drafts)?;
            print_json(&outcome)
        }
        // Malformed payloads answer with a structured error, not a failure.
        Err(e) => print_json(&json!({"error": e.to_string(), "saved": 0})),
    }
}

pub fn handle_findings_list(store_dir: &Path, args: &ArgMatches) -> anyhow::Result<()> {
    let kind = match args.get_one::<String>("type").map(String::as_str) {
        Some("") | None => None,
        Some(raw) => match raw.parse::<FindingType>() {
            Ok(kind) => Some(kind),
            Err(e) => return print_json(&json!({"error": e})),
        },
    };

    let findings = open_findings(store_dir).list(kind)?;
    print_json(&findings)
}

pub fn handle_findings_clear(store_dir: &Path) -> anyhow::Result<()> {
    open_findings(store_dir).clear()?;
    print_json(&json!({"cleared": true}))
}
