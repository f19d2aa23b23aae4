use url::Url;

/// Vocabulary that marks a link as worth following: assignment/exam/grading
/// terms, schedule and office-hour terms, lecture material terms, staff
/// terms, and common document extensions.
const KEYWORDS: &[&str] = &[
    "syllabus",
    "homework",
    "assignment",
    "hw",
    "problem set",
    "pset",
    "exam",
    "midterm",
    "final",
    "quiz",
    "test",
    "office hour",
    "oh",
    "schedule",
    "calendar",
    "grade",
    "grading",
    "policy",
    "policies",
    "lecture",
    "slide",
    "note",
    "reading",
    "lab",
    "project",
    "recitation",
    "section",
    "ta",
    "staff",
    "instructor",
    "professor",
    ".pdf",
    ".docx",
    ".doc",
];

/// Heuristic filter: does this link look like it could carry academic info?
/// Case-insensitive substring match over the URL and anchor text combined.
/// Boolean only; matches are not ranked.
pub fn is_interesting(url: &str, anchor_text: &str) -> bool {
    let combined = format!("{} {}", url, anchor_text).to_lowercase();
    KEYWORDS.iter().any(|kw| combined.contains(kw))
}

/// Network location (host, plus port when explicit) of a URL.
pub fn netloc(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Two URLs share a site when their network locations are identical.
/// Unparseable URLs are never same-site.
pub fn is_same_site(a: &str, b: &str) -> bool {
    match (netloc(a), netloc(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_in_url() {
        assert!(is_interesting("https://cs101.example.edu/syllabus.html", ""));
        assert!(is_interesting("https://cs101.example.edu/hw/1.pdf", ""));
    }

    #[test]
    fn test_keyword_match_in_anchor_text() {
        assert!(is_interesting("https://example.edu/p/42", "Midterm Exam"));
        assert!(is_interesting("https://example.edu/p/42", "Office Hours"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(is_interesting("https://example.edu/SYLLABUS", ""));
        assert!(is_interesting("https://example.edu/x", "GRADING Policy"));
    }

    #[test]
    fn test_unrelated_link_is_not_interesting() {
        // "example.edu" would match the "exam" keyword, so use a clean host.
        assert!(!is_interesting("https://school.edu/news", "click here"));
    }

    #[test]
    fn test_same_site_matches_host() {
        assert!(is_same_site(
            "https://cs101.example.edu/",
            "https://cs101.example.edu/syllabus.html"
        ));
        assert!(!is_same_site(
            "https://cs101.example.edu/",
            "https://other.example.org/x"
        ));
    }

    #[test]
    fn test_same_site_distinguishes_ports() {
        assert!(!is_same_site(
            "http://localhost:8000/",
            "http://localhost:9000/"
        ));
        assert!(is_same_site(
            "http://localhost:8000/a",
            "http://localhost:8000/b"
        ));
    }

    #[test]
    fn test_unparseable_urls_are_never_same_site() {
        assert!(!is_same_site("garbage", "garbage"));
        assert!(!is_same_site("https://example.edu/", "garbage"));
    }
}
