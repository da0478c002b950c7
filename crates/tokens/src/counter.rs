use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

// The BPE tables are embedded in the tiktoken-rs crate; loading them can only
// fail if the embedded data is malformed, which is a build defect, not a
// runtime condition.
static ENCODER: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::cl100k_base().expect("failed to load cl100k_base tokenizer"));

/// Count tokens in `text` using the `cl100k_base` encoding.
#[must_use]
pub fn count(text: &str) -> usize {
    ENCODER.encode_ordinary(text).len()
}

#[cfg(test)]
mod tests {
    use super::count;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_string_counts_zero() {
        assert_eq!(count(""), 0);
    }

    #[test]
    fn counts_are_deterministic() {
        let text = "fn main() { println!(\"hello\"); }";
        assert_eq!(count(text), count(text));
        assert!(count(text) > 0);
    }

    #[test]
    fn longer_text_never_counts_less() {
        let short = "let x = 1;";
        let long = format!("{short}\nlet y = 2;\nlet z = 3;");
        assert!(count(&long) >= count(short));
    }
}
