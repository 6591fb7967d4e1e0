use proptest::prelude::*;

use aliases::exec::tokenize;

// Words with no spaces and no quote characters.
fn plain_word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./=:-]{1,12}"
}

// Text that may contain spaces but no quote characters.
fn quotable_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _./=-]{1,20}"
}

proptest! {
    #[test]
    fn plain_words_round_trip_through_any_spacing(
        words in proptest::collection::vec(plain_word(), 0..8),
        gaps in proptest::collection::vec(1usize..4, 8),
    ) {
        let mut raw = String::new();
        for (word, gap) in words.iter().zip(gaps.iter()) {
            raw.push_str(word);
            raw.push_str(&" ".repeat(*gap));
        }

        prop_assert_eq!(tokenize(&raw), words);
    }

    #[test]
    fn quoted_text_stays_one_word(text in quotable_text(), double in any::<bool>()) {
        let quote = if double { '"' } else { '\'' };
        let raw = format!("cmd {quote}{text}{quote} tail");

        prop_assert_eq!(tokenize(&raw), vec!["cmd".to_string(), text, "tail".to_string()]);
    }

    #[test]
    fn unmatched_quote_swallows_the_rest(text in quotable_text()) {
        let raw = format!("run \"{text}");

        prop_assert_eq!(tokenize(&raw), vec!["run".to_string(), text]);
    }

    #[test]
    fn never_yields_empty_words(raw in "[a-z '\"]{0,40}") {
        for word in tokenize(&raw) {
            prop_assert!(!word.is_empty());
        }
    }

    #[test]
    fn the_other_quote_is_literal_inside_a_quoted_section(text in quotable_text()) {
        let raw = format!("'say \"{text}\"'");

        prop_assert_eq!(tokenize(&raw), vec![format!("say \"{text}\"")]);
    }
}
