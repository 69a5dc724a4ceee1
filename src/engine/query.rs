// Agent Engine — Query Processor
// Validation plus the per-query analysis facade over the shared classifier.

use crate::atoms::error::{AgentError, AgentResult};
use crate::atoms::types::{Sentiment, Severity};
use crate::engine::classify::{self, Category, Classification, Complexity, Facets};

/// Metadata extracted from one query before any tool runs.
#[derive(Debug, Clone)]
pub struct QueryAnalysis {
    pub original_query: String,
    pub emergency_level: Severity,
    pub is_greeting: bool,
    pub categories: Vec<Category>,
    pub facets: Facets,
    pub complexity: Complexity,
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryProcessor;

impl QueryProcessor {
    pub fn new() -> Self {
        QueryProcessor
    }

    /// Reject empty/whitespace-only queries and queries over 1000 chars.
    pub fn validate_query(&self, query: &str) -> AgentResult<()> {
        classify::validate_query(query).map_err(AgentError::InvalidQuery)
    }

    /// Analyze query and extract metadata. Pure.
    pub fn analyze_query(&self, query: &str) -> QueryAnalysis {
        let Classification {
            severity,
            categories,
            facets,
            complexity,
            keywords,
            sentiment,
            is_greeting,
        } = classify::classify(query);

        QueryAnalysis {
            original_query: query.to_string(),
            emergency_level: severity,
            is_greeting,
            categories,
            facets,
            complexity,
            keywords,
            sentiment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty() {
        let qp = QueryProcessor::new();
        assert!(matches!(
            qp.validate_query(""),
            Err(AgentError::InvalidQuery(_))
        ));
    }

    #[test]
    fn validate_rejects_over_1000_chars() {
        let qp = QueryProcessor::new();
        let long = "a".repeat(1001);
        assert!(qp.validate_query(&long).is_err());
        let exactly = "a".repeat(1000);
        assert!(qp.validate_query(&exactly).is_ok());
    }

    #[test]
    fn analysis_carries_emergency_level_and_greeting_flag() {
        let qp = QueryProcessor::new();
        let a = qp.analyze_query("acil yardım lazım bana");
        assert_eq!(a.emergency_level, Severity::Critical);
        assert!(!a.is_greeting);

        let g = qp.analyze_query("Merhaba");
        assert!(g.is_greeting);
        assert_eq!(g.emergency_level, Severity::Low);
    }
}
