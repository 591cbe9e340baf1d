use crate::{Result, SearchError};
use futuretree_protocol::CaseStudy;
use nucleo_matcher::{pattern::Pattern, Matcher};
use serde::{Deserialize, Serialize};

const SUMMARY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub case_study_id: String,

    /// Position in the searched slice
    pub index: usize,

    /// Normalized to 0-1 relative to the best hit
    pub score: f32,
}

/// Keyword search over case studies using nucleo-matcher
pub struct CaseStudySearch {
    matcher: Matcher,
}

impl CaseStudySearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Search by fuzzy matching against company name, strategy, tags and summary
    /// Returns hits sorted by score descending
    pub fn search(
        &mut self,
        query: &str,
        case_studies: &[CaseStudy],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let pattern = Pattern::parse(
            query,
            nucleo_matcher::pattern::CaseMatching::Smart,
            nucleo_matcher::pattern::Normalization::Smart,
        );

        let mut scored: Vec<(usize, u32)> = case_studies
            .iter()
            .enumerate()
            .filter_map(|(idx, case)| {
                let summary_preview: Option<String> = case
                    .summary
                    .as_ref()
                    .map(|s| s.chars().take(SUMMARY_PREVIEW_CHARS).collect());
                let tags = case.tags.join(" ");

                let targets = [
                    Some(case.company_name.as_str()),
                    Some(case.strategy_type.as_str()),
                    Some(case.industry.as_str()),
                    (!tags.is_empty()).then_some(tags.as_str()),
                    summary_preview.as_deref(),
                ];

                // Take best score across targets
                let best_score = targets
                    .into_iter()
                    .flatten()
                    .filter_map(|target| {
                        let haystack = nucleo_matcher::Utf32String::from(target);
                        pattern.score(haystack.slice(..), &mut self.matcher)
                    })
                    .max()?;

                Some((idx, best_score))
            })
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(limit);

        // nucleo scores are unbounded u32
        let max_score = scored.first().map(|(_, s)| *s as f32).unwrap_or(1.0);

        let hits = scored
            .into_iter()
            .map(|(idx, score)| SearchHit {
                case_study_id: case_studies[idx].id.clone(),
                index: idx,
                score: if max_score > 0.0 {
                    score as f32 / max_score
                } else {
                    0.0
                },
            })
            .collect();

        Ok(hits)
    }
}

impl Default for CaseStudySearch {
    fn default() -> Self {
        Self::new()
    }
}
