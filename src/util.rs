use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

const SCREENSHOT_DIR: &str = "assets/screenshots/";

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

pub fn humanize_key(key: &str) -> String {
    key.replace('_', " ")
}

/// `general__availability` becomes `General Availability`. URLs pass through.
pub fn format_detail_value(value: &str) -> String {
    if is_url(value) {
        return value.to_owned();
    }

    value
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn screenshot_path(reference: &str) -> String {
    let reference = reference.trim();
    if reference.starts_with("assets/") || reference.starts_with("http") {
        reference.to_owned()
    } else {
        format!("{SCREENSHOT_DIR}{}", reference.trim_start_matches('/'))
    }
}

pub fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Empty queries match everything.
pub fn matches_query(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || fuzzy_match_score(matcher, text, query).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_values_are_title_cased() {
        assert_eq!(format_detail_value("general__availability"), "General Availability");
        assert_eq!(format_detail_value("image generation"), "Image Generation");
        assert_eq!(format_detail_value("https://a.b/c_d"), "https://a.b/c_d");
        assert_eq!(humanize_key("release_stage"), "release stage");
    }

    #[test]
    fn screenshot_references_are_normalized() {
        assert_eq!(screenshot_path("x.png"), "assets/screenshots/x.png");
        assert_eq!(screenshot_path("assets/other/y.png"), "assets/other/y.png");
        assert_eq!(screenshot_path("https://cdn/z.png"), "https://cdn/z.png");
    }

    #[test]
    fn fuzzy_query_ignores_case() {
        let matcher = SkimMatcherV2::default();
        assert!(matches_query(&matcher, "Image Generation", "imggen"));
        assert!(matches_query(&matcher, "Anything", "  "));
        assert!(!matches_query(&matcher, "Voice", "xyz"));
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x, y) = stable_pair("b1");
        assert_eq!((x, y), stable_pair("b1"));
        assert!((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y));
    }
}
