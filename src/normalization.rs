/// Normalizes submitted text by stripping surrounding whitespace and
/// composing it into Unicode Normalization Form C, so that searches
/// compare like with like.
///
/// ```
/// use booking::normalization::normalize_text;
/// assert_eq!(normalize_text(" Cafe\u{301} "), "Caf\u{e9}");
/// ```
pub fn normalize_text(text: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.as_ref().trim().nfc().collect()
}
