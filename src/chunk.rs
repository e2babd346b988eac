//! Sentence-boundary text chunker.
//!
//! Splits document body text into chunks that respect a configurable
//! `max_chunk_size` character limit. Splitting occurs on sentence
//! boundaries (runs of `.`, `!`, `?`) so each chunk stays readable when
//! injected into a prompt.
//!
//! A single sentence longer than the limit is kept whole rather than
//! split mid-sentence, so the limit is a target, not a hard cap.

/// Split text into sentence-aligned chunks of at most `max_chunk_size`
/// characters (best effort). Never returns an empty vector for non-empty
/// input: text without sentence-terminating punctuation comes back as a
/// single verbatim chunk.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if current.len() + sentence.len() > max_chunk_size && !current.is_empty() {
            chunks.push(current.trim().to_string());
            current = sentence.to_string();
        } else {
            if !current.is_empty() {
                current.push_str(". ");
            }
            current.push_str(sentence);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    if chunks.is_empty() {
        return vec![text.to_string()];
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("Cats are mammals. Dogs are mammals too. Fish live in water.", 1000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0],
            "Cats are mammals. Dogs are mammals too. Fish live in water"
        );
    }

    #[test]
    fn test_no_terminator_returns_text_verbatim() {
        let chunks = chunk_text("no punctuation here at all", 1000);
        assert_eq!(chunks, vec!["no punctuation here at all".to_string()]);
    }

    #[test]
    fn test_whitespace_only_returns_original() {
        // Sentence splitting finds nothing, so the original text is the
        // single fallback chunk.
        let chunks = chunk_text("   ", 1000);
        assert_eq!(chunks, vec!["   ".to_string()]);
    }

    #[test]
    fn test_splits_on_limit() {
        let text = "First sentence is here. Second sentence is here. Third sentence is here.";
        let chunks = chunk_text(text, 30);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "First sentence is here");
        assert_eq!(chunks[1], "Second sentence is here");
        assert_eq!(chunks[2], "Third sentence is here");
    }

    #[test]
    fn test_accumulates_under_limit() {
        let text = "One. Two. Three. Four.";
        let chunks = chunk_text(text, 1000);
        assert_eq!(chunks, vec!["One. Two. Three. Four".to_string()]);
    }

    #[test]
    fn test_every_sentence_appears_exactly_once() {
        let sentences = [
            "Alpha sentence about cats",
            "Beta sentence about dogs",
            "Gamma sentence about fish",
            "Delta sentence about birds",
        ];
        let text = sentences.join(". ") + ".";
        let chunks = chunk_text(&text, 40);

        for sentence in &sentences {
            let count: usize = chunks.iter().map(|c| c.matches(sentence).count()).sum();
            assert_eq!(count, 1, "sentence missing or duplicated: {}", sentence);
        }
    }

    #[test]
    fn test_oversized_sentence_kept_whole() {
        let long = "word ".repeat(50).trim_end().to_string();
        let text = format!("Short one. {}. Another short one.", long);
        let chunks = chunk_text(&text, 30);
        assert!(chunks.iter().any(|c| c.contains(&long)));
    }

    #[test]
    fn test_size_policy_bounded_by_one_sentence() {
        // When every sentence fits the limit, a chunk can exceed the limit
        // by at most the length of the sentence that closed it.
        let text = (0..30)
            .map(|i| format!("Sentence number {} right here", i))
            .collect::<Vec<_>>()
            .join(". ");
        let max = 80;
        let longest_sentence = 30;
        for chunk in chunk_text(&text, max) {
            assert!(
                chunk.len() <= max + longest_sentence,
                "chunk too large: {} chars",
                chunk.len()
            );
        }
    }

    #[test]
    fn test_exclamation_and_question_boundaries() {
        let chunks = chunk_text("Really! Are you sure? Yes.", 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "Are you sure");
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota.";
        assert_eq!(chunk_text(text, 25), chunk_text(text, 25));
    }
}
