pub mod coerce;
pub mod error;
pub mod findings;
pub mod report;
pub mod sources;
pub mod store;
pub mod sweep;

pub use error::{CoreError, Result};
pub use findings::{
    CacheDocument, CrawlLogEntry, Finding, FindingType, FindingsStore, NewFinding, SaveOutcome,
};
pub use sources::{Source, SourceRegistry};
pub use store::{JsonFileStore, MemoryStore, Repository, StoreError};
pub use sweep::{SweepOutcome, crawl_all_sources};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
  ___ ___  _   _ _ __ ___  ___ _ __
 / __/ _ \| | | | '__/ __|/ _ \ '__|
| (_| (_) | |_| | |  \__ \  __/ |
 \___\___/ \__,_|_|  |___/\___|_|
"#;
    println!("{}", banner.bright_cyan());
    println!("{}", "  course homepage discovery crawler".dimmed());
    println!();
}
