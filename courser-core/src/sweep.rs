use crate::error::Result;
use crate::findings::{CacheDocument, CrawlLogEntry, FindingsStore};
use crate::sources::{Source, SourceRegistry};
use crate::store::Repository;
use chrono::Utc;
use courser_crawler::{CrawlResult, Crawler};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub sources_crawled: usize,
    pub results: Vec<CrawlResult>,
}

/// Crawl every registered source, sequentially, and replace the crawl log
/// with this sweep's summary. The registry is snapshotted once at the start;
/// sources added mid-sweep are not picked up. A source whose seed fetch
/// fails yields a low-content result and never halts the sweep.
pub async fn crawl_all_sources<RS, RC>(
    registry: &SourceRegistry<RS>,
    findings: &FindingsStore<RC>,
    crawler: &Crawler,
    max_subpages_per_source: usize,
) -> Result<SweepOutcome>
where
    RS: Repository<Vec<Source>>,
    RC: Repository<CacheDocument>,
{
    let sources = registry.list()?;
    info!(
        "Sweeping {} sources (budget {} per source)",
        sources.len(),
        max_subpages_per_source
    );

    let mut results = Vec::with_capacity(sources.len());
    for source in &sources {
        let mut result = crawler.crawl(&source.url, max_subpages_per_source).await;
        if result.pages_crawled.is_empty() {
            warn!("Source {} yielded no pages", source.url);
        }
        result.source_id = Some(source.id.clone());
        result.source_label = Some(source.label.clone());
        results.push(result);
    }

    let total_pages = results.iter().map(|r| r.pages_crawled.len()).sum();
    findings.record_crawl_log(CrawlLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        sources_crawled: sources.len(),
        total_pages,
    })?;

    Ok(SweepOutcome {
        sources_crawled: results.len(),
        results,
    })
}
