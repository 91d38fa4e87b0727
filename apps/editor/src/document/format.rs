use super::FieldValue;

/// Upper bound on the number of rows a field occupies in the editor view.
pub const MAX_DISPLAY_ROWS: usize = 8;

/// Text shown for a field in the read-only view, and the seed of the edit
/// buffer when the field is activated.
///
/// - `Scalar`: verbatim
/// - `ScalarList`: one entry per paragraph
/// - `RecordList`: each record's `key: value` lines, records separated by a blank line
pub fn format_for_display(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(text) => text.clone(),
        FieldValue::ScalarList(items) => items.join("\n\n"),
        FieldValue::RecordList(records) => records
            .iter()
            .map(|r| r.pairs_joined("\n"))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Single-line description of a field sent to the enhancement service.
pub fn flatten_for_enhancement(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(text) => text.clone(),
        FieldValue::ScalarList(items) => items.join("; "),
        FieldValue::RecordList(records) => records
            .iter()
            .map(|r| r.pairs_joined(", "))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// Rows needed to show `formatted` text: one per line plus one, capped.
pub fn display_rows(formatted: &str) -> usize {
    (formatted.split('\n').count() + 1).min(MAX_DISPLAY_ROWS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse_or_fallback, Record};

    fn projects() -> FieldValue {
        FieldValue::RecordList(vec![
            [("title", "Shop"), ("duration", "2024")].into_iter().collect::<Record>(),
            [("title", "Blog")].into_iter().collect::<Record>(),
        ])
    }

    #[test]
    fn test_format_scalar_is_verbatim() {
        let value = FieldValue::Scalar("line one\nline two".to_string());
        assert_eq!(format_for_display(&value), "line one\nline two");
    }

    #[test]
    fn test_format_scalar_list_separates_entries() {
        let value = FieldValue::ScalarList(vec!["Led team".into(), "Won hackathon".into()]);
        assert_eq!(format_for_display(&value), "Led team\n\nWon hackathon");
    }

    #[test]
    fn test_format_record_list_uses_key_value_lines() {
        assert_eq!(
            format_for_display(&projects()),
            "title: Shop\nduration: 2024\n\ntitle: Blog"
        );
    }

    #[test]
    fn test_flatten_joins_on_one_line() {
        assert_eq!(
            flatten_for_enhancement(&projects()),
            "title: Shop, duration: 2024; title: Blog"
        );
        assert_eq!(
            flatten_for_enhancement(&FieldValue::ScalarList(vec!["a".into(), "b".into()])),
            "a; b"
        );
    }

    #[test]
    fn test_display_rows_is_capped() {
        assert_eq!(display_rows(""), 2);
        assert_eq!(display_rows("a\nb\nc"), 4);
        assert_eq!(display_rows(&"x\n".repeat(20)), MAX_DISPLAY_ROWS);
    }

    #[test]
    fn test_scalar_text_round_trips_through_display() {
        for text in ["Plain objective", "{ not json", "a: b\n\nc: d", ""] {
            let value = parse_or_fallback(text);
            assert_eq!(format_for_display(&value), text);
        }
    }
}
