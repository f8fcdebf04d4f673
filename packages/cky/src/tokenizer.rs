//! Whitespace tokenization with treebank-style punctuation and clitic splitting.

use crate::grammars::types::Terminal;

const OPENING: &[char] = &['(', '[', '{', '"', '`'];
const CLOSING: &[char] = &[',', ';', ':', '!', '?', ')', ']', '}', '"', '\''];
const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Splits a trailing clitic (`n't`, `'s`, ...) off `word`, matching case-insensitively.
fn split_clitic(word: &str) -> (&str, Option<&str>) {
    let lower = word.to_lowercase();
    if lower.len() != word.len() {
        return (word, None);
    }

    for clitic in CLITICS {
        let at = word.len().saturating_sub(clitic.len());
        if at > 0 && lower.ends_with(clitic) && word.is_char_boundary(at) {
            return (&word[..at], Some(&word[at..]));
        }
    }

    (word, None)
}

fn tokenize_chunk(chunk: &str, is_last: bool, tokens: &mut Vec<String>) {
    if chunk.chars().all(is_punctuation) {
        tokens.push(chunk.to_string());
        return;
    }

    let mut rest = chunk;
    while let Some(c) = rest.chars().next().filter(|c| OPENING.contains(c)) {
        let (head, tail) = rest.split_at(c.len_utf8());
        tokens.push(head.to_string());
        rest = tail;
    }

    let mut trailing = Vec::new();
    while let Some(c) = rest.chars().next_back().filter(|c| {
        CLOSING.contains(c) || (is_last && *c == '.')
    }) {
        let (head, tail) = rest.split_at(rest.len() - c.len_utf8());
        trailing.push(tail.to_string());
        rest = head;
    }

    if !rest.is_empty() {
        let (word, clitic) = split_clitic(rest);
        tokens.push(word.to_string());
        tokens.extend(clitic.map(str::to_string));
    }

    tokens.extend(trailing.into_iter().rev());
}

/// Splits a sentence into terminals.
///
/// Whitespace separates chunks; a chunk made only of punctuation (`...`, `--`)
/// is kept whole. Otherwise opening brackets and quotes, closing punctuation,
/// a possessive `'`, the sentence-final period and English clitics become
/// tokens of their own.
pub fn tokenize(sentence: &str) -> Vec<Terminal> {
    let chunks = sentence.split_whitespace().collect::<Vec<_>>();
    let mut tokens = Vec::with_capacity(chunks.len());

    for (idx, chunk) in chunks.iter().enumerate() {
        tokenize_chunk(chunk, idx + 1 == chunks.len(), &mut tokens);
    }

    tokens.into_iter().map(Terminal::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(sentence: &str) -> Vec<String> {
        tokenize(sentence)
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(words("  the dog\tbarks \n"), ["the", "dog", "barks"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn separates_punctuation() {
        assert_eq!(
            words("Well, (he said) it barks."),
            ["Well", ",", "(", "he", "said", ")", "it", "barks", "."]
        );
        assert_eq!(words("\"Stop!\""), ["\"", "Stop", "!", "\""]);
    }

    #[test]
    fn keeps_inner_periods() {
        assert_eq!(words("Mr. Smith left."), ["Mr.", "Smith", "left", "."]);
        assert_eq!(words("e.g. this"), ["e.g.", "this"]);
    }

    #[test]
    fn splits_clitics() {
        assert_eq!(
            words("I don't think it's John's"),
            ["I", "do", "n't", "think", "it", "'s", "John", "'s"]
        );
        assert_eq!(words("WE'LL see"), ["WE", "'LL", "see"]);
    }

    #[test]
    fn splits_possessive_quotes_anywhere() {
        assert_eq!(
            words("the dogs' bones bark"),
            ["the", "dogs", "'", "bones", "bark"]
        );
        assert_eq!(words("rock'n'roll"), ["rock'n'roll"]);
    }

    #[test]
    fn keeps_punctuation_runs() {
        assert_eq!(words("wait ... what ?!"), ["wait", "...", "what", "?!"]);
    }
}
