use log::{debug, info, warn};
use crate::errors::WikiError;
use crate::types::SearchResult;
use crate::services::FileService;

/// Longest accepted query, in characters
const MAX_QUERY_CHARS: usize = 1000;
/// Characters of context around a full-text hit
const EXCERPT_CONTEXT: usize = 80;

/// Service for title and full-text search over the page store
pub struct SearchService {
    file_service: FileService,
}

impl SearchService {
    /// Create a new search service
    pub fn new(file_service: FileService) -> Self {
        Self { file_service }
    }

    /// Pages whose name contains the query, case-insensitively
    pub fn title_search(&self, query: &str) -> Result<Vec<SearchResult>, WikiError> {
        let query = clamp_query(query);
        if query.is_empty() {
            debug!("Empty title search query received");
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let results: Vec<SearchResult> = self
            .file_service
            .list_pages()?
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .map(|name| SearchResult {
                title: name.clone(),
                page_name: name,
                excerpt: String::new(),
                relevance: 1.0,
            })
            .collect();
        info!("Title search for '{}' found {} pages", query, results.len());
        Ok(results)
    }

    /// Pages whose name or text contains the query, best matches first
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, WikiError> {
        let query = clamp_query(query);
        if query.is_empty() {
            debug!("Empty search query received");
            return Ok(Vec::new());
        }

        info!("Starting search for query: '{}'", query);
        let start_time = std::time::Instant::now();
        let needle = query.to_lowercase();

        let mut results = Vec::new();
        for page_name in self.file_service.list_pages()? {
            let content = match self.file_service.read_page(&page_name) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read page '{}': {}", page_name, e);
                    continue;
                }
            };
            let relevance = calculate_relevance(&page_name, &content, &needle);
            if relevance > 0.0 {
                results.push(SearchResult {
                    title: page_name.clone(),
                    excerpt: generate_excerpt(&content, &needle),
                    page_name,
                    relevance,
                });
            }
        }

        results.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.page_name.cmp(&b.page_name))
        });

        let duration = start_time.elapsed();
        info!("Search completed in {:?}ms, found {} results", duration.as_millis(), results.len());
        Ok(results)
    }
}

fn clamp_query(query: &str) -> String {
    let query = query.trim();
    if query.chars().count() > MAX_QUERY_CHARS {
        warn!("Very long search query received ({} chars), truncating", query.chars().count());
        query.chars().take(MAX_QUERY_CHARS).collect()
    } else {
        query.to_string()
    }
}

/// Score a page; zero means no match
fn calculate_relevance(page_name: &str, content: &str, needle: &str) -> f32 {
    let content_lower = content.to_lowercase();
    let mut score = 0.0;

    if page_name.to_lowercase().contains(needle) {
        score += 15.0;
    }
    let hits = content_lower.matches(needle).count();
    if hits > 0 {
        score += 20.0 + (hits.min(10) as f32);
    }
    for line in content.lines().filter(|l| l.starts_with('#')) {
        if line.to_lowercase().contains(needle) {
            score += 8.0;
        }
    }
    score
}

/// Text around the first hit, on character boundaries
fn generate_excerpt(content: &str, needle: &str) -> String {
    let lower: Vec<char> = content.to_lowercase().chars().collect();
    let chars: Vec<char> = content.chars().collect();
    let needle: Vec<char> = needle.chars().collect();

    // lowercasing may change the length of some characters; fall back to the start then
    let pos = if lower.len() == chars.len() && !needle.is_empty() {
        lower.windows(needle.len()).position(|w| w == needle.as_slice())
    } else {
        None
    };

    match pos {
        Some(pos) => {
            let start = pos.saturating_sub(EXCERPT_CONTEXT);
            let end = (pos + needle.len() + EXCERPT_CONTEXT).min(chars.len());
            let body: String = chars[start..end].iter().collect();
            let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
            let prefix = if start > 0 { "..." } else { "" };
            let suffix = if end < chars.len() { "..." } else { "" };
            format!("{}{}{}", prefix, body, suffix)
        }
        None => content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| l.chars().take(EXCERPT_CONTEXT * 2).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn service() -> (tempfile::TempDir, SearchService) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("FrontPage.md"),
            "# Welcome\n\nThe wiki front page mentions gardening.\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("Gardening.md"),
            "# Gardening\n\nTomatoes need sun. Gardening is fun.\n",
        )
        .unwrap();
        fs::write(dir.path().join("Cooking.md"), "Soup recipes.\n").unwrap();
        let search = SearchService::new(FileService::new(dir.path().to_path_buf()));
        (dir, search)
    }

    #[test]
    fn title_search_matches_names() {
        let (_dir, search) = service();
        let names: Vec<String> = search
            .title_search("garden")
            .unwrap()
            .into_iter()
            .map(|r| r.page_name)
            .collect();
        assert_eq!(names, vec!["Gardening"]);
        assert!(search.title_search("   ").unwrap().is_empty());
    }

    #[test]
    fn full_text_search_ranks_results() {
        let (_dir, search) = service();
        let results = search.search("gardening").unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.page_name.as_str()).collect();
        assert_eq!(names, vec!["Gardening", "FrontPage"]);
        assert!(results[1].excerpt.contains("gardening"));
    }

    #[test]
    fn excerpt_marks_truncation() {
        let text = format!("{} needle {}", "a ".repeat(100), "b ".repeat(100));
        let excerpt = generate_excerpt(&text, "needle");
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.contains("needle"));
    }
}
