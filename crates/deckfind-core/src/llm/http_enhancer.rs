//! HTTP-based query enhancer using external LLM service
//!
//! Reformulates free-text user queries and extracts vocabulary-exact
//! entities (keywords, industry, company) used downstream for filter
//! construction and boost re-ranking. Model output is filtered against the
//! vocabulary: anything the model invents is dropped.

use super::{ChatMessage, EnhancedQuery, LlmClient, QueryEnhancer};
use crate::config::LlmServiceConfig;
use crate::error::{DeckFindError, Result};
use crate::vocab::KnownVocabulary;
use async_trait::async_trait;
use std::sync::Arc;

/// Query enhancer using external HTTP LLM service
pub struct HttpQueryEnhancer {
    client: Arc<dyn LlmClient>,
}

impl HttpQueryEnhancer {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: LlmServiceConfig) -> Result<Self> {
        let client = super::OpenAiClient::new(config)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let client = super::OpenAiClient::from_env()?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl QueryEnhancer for HttpQueryEnhancer {
    async fn enhance(
        &self,
        query: &str,
        vocabulary: &KnownVocabulary,
    ) -> Result<EnhancedQuery> {
        let prompt = build_enhancement_prompt(query, vocabulary);

        let messages = vec![
            ChatMessage::system(
                "You improve search queries over a pitch-deck knowledge base. \
                 Output ONLY valid JSON with these fields: \
                 improved_query (string), matched_keywords (array of strings), \
                 target_industry (string or null), target_company (string or null). \
                 matched_keywords, target_industry and target_company must be copied \
                 verbatim from the provided vocabulary, never invented.",
            ),
            ChatMessage::user(prompt),
        ];

        let response = self
            .client
            .chat_completion(messages)
            .await
            .map_err(|e| DeckFindError::QueryEnhancement(e.to_string()))?;

        let enhanced = parse_enhancement_response(&response, query)?;
        Ok(restrict_to_vocabulary(enhanced, vocabulary))
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}

fn build_enhancement_prompt(query: &str, vocabulary: &KnownVocabulary) -> String {
    let keywords: Vec<&str> = vocabulary.keywords.iter().map(String::as_str).collect();
    let industries: Vec<&str> = vocabulary.industries.iter().map(String::as_str).collect();
    let companies: Vec<&str> = vocabulary.companies.iter().map(String::as_str).collect();

    format!(
        r#"Improve this search query for semantic retrieval over pitch decks:

Query: "{}"

Known keywords: {}
Known industries: {}
Known companies: {}

Rules:
1. improved_query: rephrase for retrieval (expand abbreviations, add intent), keep the original language
2. matched_keywords: only keywords from the known list that the query is about
3. target_industry / target_company: only if the query clearly names one from the known lists, else null

Example:
Input: "influencer marketing campaigns for insurers"
Output: {{"improved_query": "insurance industry influencer marketing campaign strategy and results", "matched_keywords": ["Marketing", "Campaign"], "target_industry": "Insurance", "target_company": null}}

Now enhance the query above. Output only JSON:"#,
        query,
        keywords.join(", "),
        industries.join(", "),
        companies.join(", "),
    )
}

fn parse_enhancement_response(response: &str, original_query: &str) -> Result<EnhancedQuery> {
    // Extract JSON from response (handle markdown code blocks and extra text)
    let json_str = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => {
            return Err(DeckFindError::QueryEnhancement(format!(
                "no JSON object in enhancement response: {}",
                response.chars().take(120).collect::<String>()
            )))
        }
    };

    let parsed: serde_json::Value = serde_json::from_str(json_str).map_err(|e| {
        tracing::debug!("Raw enhancement response: {}", response);
        DeckFindError::QueryEnhancement(format!("JSON parse error: {}", e))
    })?;

    let improved_query = parsed["improved_query"]
        .as_str()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(original_query)
        .to_string();

    let matched_keywords = parsed["matched_keywords"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let target_industry = parsed["target_industry"]
        .as_str()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    let target_company = parsed["target_company"]
        .as_str()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty());

    Ok(EnhancedQuery {
        improved_query,
        matched_keywords,
        target_industry,
        target_company,
    })
}

/// Drop any model output that is not a verified vocabulary member.
fn restrict_to_vocabulary(
    mut enhanced: EnhancedQuery,
    vocabulary: &KnownVocabulary,
) -> EnhancedQuery {
    let before = enhanced.matched_keywords.len();
    enhanced
        .matched_keywords
        .retain(|kw| vocabulary.contains_keyword(kw));
    if enhanced.matched_keywords.len() < before {
        tracing::warn!(
            "Dropped {} out-of-vocabulary keywords from enhancement output",
            before - enhanced.matched_keywords.len()
        );
    }

    enhanced.target_industry = enhanced
        .target_industry
        .filter(|i| vocabulary.contains_industry(i));
    enhanced.target_company = enhanced
        .target_company
        .filter(|c| vocabulary.contains_company(c));

    enhanced
}
