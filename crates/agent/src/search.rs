use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use expenso_core::config::SearchConfig;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("policy search backend is not configured")]
    NotConfigured,
    #[error("policy search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("policy search backend returned status {0}")]
    BackendStatus(u16),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyExcerpt {
    pub content: String,
    pub category: String,
    pub score: f64,
    #[serde(default)]
    pub source_document: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySearchResults {
    pub query: String,
    pub category_filter: Option<String>,
    pub total_results: usize,
    pub policy_excerpts: Vec<PolicyExcerpt>,
    pub sources: Vec<String>,
}

#[async_trait]
pub trait PolicySearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<PolicySearchResults, SearchError>;
}

/// Client for an external policy document index. Expects a JSON search
/// endpoint at `{base_url}/search`.
#[derive(Debug)]
pub struct HttpPolicySearch {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    max_results: u32,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    top: u32,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    source_document: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl HttpPolicySearch {
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let base_url = match config.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => return Err(SearchError::NotConfigured),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, base_url, api_key: config.api_key.clone(), max_results: config.max_results })
    }
}

#[async_trait]
impl PolicySearch for HttpPolicySearch {
    async fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<PolicySearchResults, SearchError> {
        let mut request = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest { query, category, top: self.max_results });

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BackendStatus(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;

        let mut results = PolicySearchResults {
            query: query.to_string(),
            category_filter: category.map(str::to_string),
            ..PolicySearchResults::default()
        };
        for hit in body.results {
            results.total_results += 1;
            if !hit.source_document.is_empty()
                && !results.sources.contains(&hit.source_document)
            {
                results.sources.push(hit.source_document.clone());
            }
            results.policy_excerpts.push(PolicyExcerpt {
                content: hit.content,
                category: hit.category,
                score: hit.score,
                source_document: hit.source_document,
            });
        }

        Ok(results)
    }
}

/// Built-in excerpts of the travel and expense policy, used when no search
/// backend is configured. Keeps the search tool answerable offline.
#[derive(Default)]
pub struct StaticPolicySearch;

struct StaticEntry {
    section: &'static str,
    category: &'static str,
    content: &'static str,
    keywords: &'static [&'static str],
}

const STATIC_POLICY: &[StaticEntry] = &[
    StaticEntry {
        section: "Section 2.1 - Documentation Requirements",
        category: "general",
        content: "Receipts are required for all expenses over $25. Submit itemized receipts \
                  with each report.",
        keywords: &["receipt", "document", "documentation", "itemized", "proof"],
    },
    StaticEntry {
        section: "Section 3.2 - Meal Allowances",
        category: "meals",
        content: "Meal expenses are limited to $100 per day. Meals over $50 should include a \
                  business justification.",
        keywords: &["meal", "meals", "food", "dinner", "lunch", "breakfast", "per diem"],
    },
    StaticEntry {
        section: "Section 4.1 - Accommodation Limits",
        category: "lodging",
        content: "Lodging is limited to $300 per night. Book through the corporate travel \
                  portal where available.",
        keywords: &["hotel", "lodging", "accommodation", "night", "stay"],
    },
    StaticEntry {
        section: "Section 5.3 - Ground Transportation",
        category: "transportation",
        content: "Ride-share expenses over $75 may require business justification. Car \
                  rentals over $500 require the rental agreement and fuel receipts.",
        keywords: &["uber", "lyft", "taxi", "rental", "transportation", "mileage", "parking"],
    },
    StaticEntry {
        section: "Section 5.1 - Air Travel",
        category: "airfare",
        content: "Airfare over $1000 may require manager approval for business class. Keep \
                  the flight itinerary and boarding passes.",
        keywords: &["flight", "airfare", "airline", "business class", "travel"],
    },
];

#[async_trait]
impl PolicySearch for StaticPolicySearch {
    async fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<PolicySearchResults, SearchError> {
        let query_lower = query.to_lowercase();
        let mut results = PolicySearchResults {
            query: query.to_string(),
            category_filter: category.map(str::to_string),
            ..PolicySearchResults::default()
        };

        for entry in STATIC_POLICY {
            if let Some(filter) = category {
                if !filter.eq_ignore_ascii_case(entry.category) {
                    continue;
                }
            }

            let matched = entry
                .keywords
                .iter()
                .filter(|keyword| query_lower.contains(*keyword))
                .count();
            if matched == 0 && category.is_none() {
                continue;
            }

            results.total_results += 1;
            results.policy_excerpts.push(PolicyExcerpt {
                content: entry.content.to_string(),
                category: entry.category.to_string(),
                score: matched as f64 / entry.keywords.len() as f64,
                source_document: entry.section.to_string(),
            });
            results.sources.push(entry.section.to_string());
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use expenso_core::config::SearchConfig;

    use super::{HttpPolicySearch, PolicySearch, SearchError, StaticPolicySearch};

    #[tokio::test]
    async fn static_search_matches_on_keywords() {
        let search = StaticPolicySearch;
        let results =
            search.search("what is the meal limit for dinner", None).await.expect("search");

        assert_eq!(results.total_results, 1);
        assert!(results.sources[0].contains("Section 3.2"));
        assert!(results.policy_excerpts[0].content.contains("$100 per day"));
    }

    #[tokio::test]
    async fn static_search_category_filter_returns_the_section_even_without_keywords() {
        let search = StaticPolicySearch;
        let results = search.search("limits please", Some("lodging")).await.expect("search");

        assert_eq!(results.total_results, 1);
        assert_eq!(results.policy_excerpts[0].category, "lodging");
    }

    #[tokio::test]
    async fn static_search_with_no_match_is_empty_not_an_error() {
        let search = StaticPolicySearch;
        let results = search.search("quarterly revenue targets", None).await.expect("search");

        assert_eq!(results.total_results, 0);
        assert!(results.policy_excerpts.is_empty());
    }

    #[test]
    fn http_search_requires_a_base_url() {
        let config = SearchConfig {
            enabled: true,
            base_url: None,
            api_key: None,
            timeout_secs: 10,
            max_results: 5,
        };

        let error = HttpPolicySearch::from_config(&config).expect_err("missing base url");
        assert!(matches!(error, SearchError::NotConfigured));
    }

    #[test]
    fn http_search_normalizes_trailing_slash() {
        let config = SearchConfig {
            enabled: true,
            base_url: Some("https://policy.example.com/".to_string()),
            api_key: None,
            timeout_secs: 10,
            max_results: 5,
        };

        let search = HttpPolicySearch::from_config(&config).expect("build client");
        assert_eq!(search.base_url, "https://policy.example.com");
    }
}
