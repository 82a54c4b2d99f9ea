use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::content::ContentIndex;

pub(in crate::app) const MAX_JUMP_RESULTS: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct JumpMatch {
    pub slug: String,
    pub label: String,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Pages whose title or slug fuzzily matches `query`, best first. Ties keep
/// slug order so the list does not shuffle between frames.
pub(in crate::app) fn page_matches(index: &ContentIndex, query: &str, limit: usize) -> Vec<JumpMatch> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = index
        .iter()
        .filter_map(|(slug, record)| {
            let label = record.label();
            let score = fuzzy_match_score(&matcher, label, query)
                .into_iter()
                .chain(fuzzy_match_score(&matcher, slug, query))
                .max()?;
            Some((score, slug, label))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, slug, label)| JumpMatch {
            slug: slug.to_owned(),
            label: label.to_owned(),
        })
        .collect()
}
