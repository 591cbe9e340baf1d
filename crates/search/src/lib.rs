//! # FutureTree Search
//!
//! Case-study similarity matching for business profiles.
//!
//! ## Pipeline
//!
//! ```text
//! BusinessProfile + CaseStudy[]
//!     │
//!     ├──> Comparators (fuzzy, Jaccard, bucket distance, geography)
//!     │      └─> six 0-100 sub-scores per candidate
//!     │
//!     ├──> Weighted sum → threshold → sort → truncate → dense rank
//!     │
//!     └──> Explanations + recommended strategy (top 20 matches)
//! ```
//!
//! ## Example
//!
//! ```
//! use futuretree_protocol::{BusinessProfile, CaseStudy};
//! use futuretree_search::{MatchOptions, SimilarityMatcher};
//!
//! let matcher = SimilarityMatcher::default();
//! let profile = BusinessProfile {
//!     industry: "Architecture".into(),
//!     revenue: Some("500k-1m".into()),
//!     ..Default::default()
//! };
//! let corpus = vec![CaseStudy {
//!     id: "c1".into(),
//!     company_name: "Studio North".into(),
//!     industry: "architecture".into(),
//!     strategy_type: "niche-specialization".into(),
//!     ..Default::default()
//! }];
//!
//! let result = matcher.match_profile(&profile, &corpus, &MatchOptions::default());
//! assert_eq!(result.matches[0].score.industry, 100.0);
//! ```

pub mod comparators;
mod config;
mod error;
mod explain;
mod fuzzy;
mod recommend;
mod similarity;

pub use comparators::BucketTable;
pub use config::{MatchOptions, MatchWeights, MatchingConfig};
pub use error::{Result, SearchError};
pub use explain::{explain_match, key_takeaways};
pub use fuzzy::{CaseStudySearch, SearchHit};
pub use recommend::{recommend_path, RecommendedPath};
pub use similarity::{CaseStudyMatch, MatchScore, MatchingResult, SimilarityMatcher};
