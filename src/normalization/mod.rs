pub mod similarity;
pub mod skip;
pub mod title;

pub use similarity::{levenshtein_within, rescore, token_difference, EXACT_MATCH_SCORE};
pub use skip::SkipFilter;
pub use title::TitleNormalizer;
