/// Canonical form used for question keys and organization matching: zero-width characters
/// removed, whitespace collapsed to single spaces, case-folded.
pub fn normalize_text(value: &str) -> String {
    let cleaned = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .replace('\u{00a0}', " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_text;

    #[test]
    fn collapses_whitespace_and_case() {
        assert_eq!(
            normalize_text("  What is your\tNotice   period?  "),
            "what is your notice period?"
        );
    }

    #[test]
    fn strips_invisible_characters() {
        assert_eq!(normalize_text("\u{feff}Acme\u{200b} Corp"), "acme corp");
        assert_eq!(normalize_text("Acme\u{00a0}Corp"), "acme corp");
    }
}
