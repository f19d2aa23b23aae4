use crate::error::Result;
use crate::store::Repository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    Homework,
    Exam,
    OfficeHours,
    Syllabus,
    Lecture,
    Other,
}

impl FindingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::Homework => "homework",
            FindingType::Exam => "exam",
            FindingType::OfficeHours => "office_hours",
            FindingType::Syllabus => "syllabus",
            FindingType::Lecture => "lecture",
            FindingType::Other => "other",
        }
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "homework" => Ok(FindingType::Homework),
            "exam" => Ok(FindingType::Exam),
            "office_hours" => Ok(FindingType::OfficeHours),
            "syllabus" => Ok(FindingType::Syllabus),
            "lecture" => Ok(FindingType::Lecture),
            "other" => Ok(FindingType::Other),
            unknown => Err(format!("unknown finding type: {}", unknown)),
        }
    }
}

impl Default for FindingType {
    fn default() -> Self {
        FindingType::Other
    }
}

/// A curated fact about a course, supplied by the caller after it has read
/// crawl output. The store owns stamping and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FindingType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_info: Option<String>,
    #[serde(rename = "savedAt")]
    pub saved_at: String,
}

/// Caller-supplied draft of a finding; `savedAt` and (when absent) `id` are
/// assigned by the store on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFinding {
    pub id: Option<String>,
    pub kind: FindingType,
    pub title: String,
    pub description: String,
    pub source_url: String,
    pub due_date: Option<String>,
    pub location: Option<String>,
    pub time_info: Option<String>,
}

/// Audit record for the most recent sweep. The persisted log keeps only one
/// entry (replace-on-write).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlLogEntry {
    pub timestamp: String,
    pub sources_crawled: usize,
    pub total_pages: usize,
}

/// The persisted findings/cache document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(rename = "crawlLog", default)]
    pub crawl_log: Vec<CrawlLogEntry>,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub saved: usize,
    pub total: usize,
}

/// Upsert-by-id store for curated findings. Every mutation is a full
/// read-modify-write of the document, so it runs under a mutex: concurrent
/// saves would otherwise lose updates.
pub struct FindingsStore<R> {
    repo: R,
    write_lock: Mutex<()>,
}

impl<R: Repository<CacheDocument>> FindingsStore<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Merge a batch into the stored collection. Stored findings whose id is
    /// resubmitted are replaced; the rest are retained ahead of the new
    /// batch, which keeps submission order. Missing ids are synthesized from
    /// type + sequence + time of day.
    pub fn save(&self, submitted: Vec<NewFinding>) -> Result<SaveOutcome> {
        let _guard = self.write_lock.lock().unwrap();
        let mut doc = self.repo.read()?;

        let existing_count = doc.findings.len();
        let now = Utc::now();
        let stamp = now.to_rfc3339();
        let time_of_day = now.format("%H%M%S").to_string();

        let incoming: Vec<Finding> = submitted
            .into_iter()
            .enumerate()
            .map(|(i, draft)| Finding {
                id: draft.id.unwrap_or_else(|| {
                    format!("{}-{}-{}", draft.kind, existing_count + i, time_of_day)
                }),
                kind: draft.kind,
                title: draft.title,
                description: draft.description,
                source_url: draft.source_url,
                due_date: draft.due_date,
                location: draft.location,
                time_info: draft.time_info,
                saved_at: stamp.clone(),
            })
            .collect();

        let saved = incoming.len();
        let resubmitted: HashSet<&str> = incoming.iter().map(|f| f.id.as_str()).collect();
        doc.findings.retain(|f| !resubmitted.contains(f.id.as_str()));
        doc.findings.extend(incoming);
        doc.last_updated = Some(stamp);

        self.repo.write(&doc)?;
        info!("Saved {} findings, {} total", saved, doc.findings.len());
        Ok(SaveOutcome {
            saved,
            total: doc.findings.len(),
        })
    }

    /// Full stored collection, filtered by exact type when one is given.
    /// Also refreshes the store's `lastUpdated` marker even though the call
    /// is read-only in effect.
    pub fn list(&self, kind: Option<FindingType>) -> Result<Vec<Finding>> {
        let _guard = self.write_lock.lock().unwrap();
        let mut doc = self.repo.read()?;
        doc.last_updated = Some(Utc::now().to_rfc3339());
        self.repo.write(&doc)?;

        let findings = match kind {
            Some(kind) => doc.findings.into_iter().filter(|f| f.kind == kind).collect(),
            None => doc.findings,
        };
        Ok(findings)
    }

    /// Empty the findings collection. Other document keys, the crawl log
    /// included, are untouched.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let mut doc = self.repo.read()?;
        doc.findings.clear();
        doc.last_updated = Some(Utc::now().to_rfc3339());
        self.repo.write(&doc)?;
        info!("Cleared all findings");
        Ok(())
    }

    /// Replace the crawl log with the latest sweep's summary.
    pub fn record_crawl_log(&self, entry: CrawlLogEntry) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let mut doc = self.repo.read()?;
        doc.crawl_log = vec![entry];
        doc.last_updated = Some(Utc::now().to_rfc3339());
        self.repo.write(&doc)?;
        Ok(())
    }
}
