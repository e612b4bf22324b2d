use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::constants::is_keyword_candidate;

/// Everything except lowercase ASCII letters, digits, Hangul syllables and plain spaces.
static NON_KEYWORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9가-힣 ]").expect("keyword character class is valid"));

/// Lowercases `text`, strips punctuation and splits it into candidate keywords.
pub fn extract_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_KEYWORD_CHARS.replace_all(&lowered, "");

    cleaned
        .split_whitespace()
        .filter(|word| is_keyword_candidate(word))
        .map(str::to_string)
        .collect()
}

/// Adds the words of every source to `counts`.
pub fn count_words<'a>(sources: impl IntoIterator<Item = &'a str>, counts: &mut HashMap<String, u64>) {
    for text in sources {
        for word in extract_words(text) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }
}

/// The `limit` most frequent words across `sources`. Ties are broken
/// alphabetically so the ranking is stable between calls.
pub fn top_keywords(sources: &[String], limit: usize) -> Vec<String> {
    let mut counts = HashMap::new();
    count_words(sources.iter().map(String::as_str), &mut counts);

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|(word_a, count_a), (word_b, count_b)| {
        count_b.cmp(count_a).then_with(|| word_a.cmp(word_b))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _)| word)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_words_normalises() {
        assert_eq!(
            extract_words("Morning WALK at the Park!"),
            vec!["morning", "walk", "park"]
        );
    }

    #[test]
    fn test_extract_words_keeps_hangul_and_drops_short_words() {
        assert_eq!(
            extract_words("해운대 산책 a b 강아지는 는"),
            vec!["해운대", "산책", "강아지는"]
        );
    }

    #[test]
    fn test_punctuation_inside_words_is_removed() {
        assert_eq!(extract_words("dog-friendly café"), vec!["dogfriendly", "caf"]);
    }

    #[test]
    fn test_top_keywords_ranks_by_frequency() {
        let sources = vec![
            "Morning walk".to_string(),
            "Evening walk".to_string(),
            "Beach walk".to_string(),
            "Central Park".to_string(),
            "Beach".to_string(),
            "dog".to_string(),
            "Dog".to_string(),
            "dog".to_string(),
        ];

        assert_eq!(top_keywords(&sources, 3), vec!["dog", "walk", "beach"]);
    }

    #[test]
    fn test_top_keywords_ties_are_alphabetical() {
        let sources = vec!["zebra apple mango".to_string()];
        assert_eq!(top_keywords(&sources, 5), vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_top_keywords_empty() {
        assert!(top_keywords(&[], 5).is_empty());
        assert!(top_keywords(&["walk".to_string()], 0).is_empty());
    }
}
