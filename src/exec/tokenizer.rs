// src/exec/tokenizer.rs

//! Splitting of an alias's raw `args` string into words.

/// Split `raw` into words.
///
/// - Spaces outside quotes separate words; runs of spaces produce no empty
///   words.
/// - A `'` or `"` opens a quoted section closed by the same character. Inside
///   it everything, including spaces and the other quote character, is taken
///   literally. The quote characters themselves are dropped.
/// - Only one open quote is tracked; an unmatched quote runs to the end of
///   the input.
/// - A trailing partial word is flushed as the final token.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut quote: Option<char> = None;
    let mut word = String::new();

    for ch in raw.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => word.push(ch),
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == ' ' => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
            }
            None => word.push(ch),
        }
    }

    if !word.is_empty() {
        tokens.push(word);
    }

    tokens
}
