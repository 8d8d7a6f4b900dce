//! Lexical relevance scoring shared by the retrieval paths.

use std::collections::HashSet;

/// Jaccard similarity over lower-cased whitespace-tokenized word sets.
///
/// Deterministic and order-independent: `relevance(a, b) == relevance(b, a)`,
/// bounded to `[0.0, 1.0]`. Returns 0.0 when either side has no tokens.
pub fn relevance(context: &str, memory_content: &str) -> f64 {
    let context_lower = context.to_lowercase();
    let memory_lower = memory_content.to_lowercase();

    let context_words: HashSet<&str> = context_lower.split_whitespace().collect();
    let memory_words: HashSet<&str> = memory_lower.split_whitespace().collect();

    if context_words.is_empty() || memory_words.is_empty() {
        return 0.0;
    }

    let intersection = context_words.intersection(&memory_words).count();
    let union = context_words.union(&memory_words).count();

    intersection as f64 / union as f64
}
