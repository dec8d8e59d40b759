use std::sync::OnceLock;

use regex::Regex;

use crate::engine::RawOcrFragment;
use crate::ledger::{GuestCategory, GuestNote, LedgerEntry};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// 100,000 / 100, / 50,000원 / 30,000- ; the suffix is matched but not captured
re!(re_amount, r"(\d{1,3}(?:,\d{3})*,?)\s*(?:-|원)?");
// 大2 / 小 1 / 소3
re!(re_note, r"(大|小|소)\s*(\d+)");
re!(re_name, r"[가-힣]{2,4}");

// ── Public parsing API ───────────────────────────────────────────────────────

/// Parse every fragment, keeping source order. Fragments with neither a name
/// nor an amount produce nothing.
pub fn parse_fragments(fragments: &[RawOcrFragment]) -> Vec<LedgerEntry> {
    fragments.iter().filter_map(parse_fragment).collect()
}

/// Parse one OCR fragment into at most one ledger row.
///
/// The three fields are extracted independently from the same text, first
/// match wins. No merging with neighbouring fragments happens here, so a name
/// and an amount that the engine split apart become two partial rows.
pub fn parse_fragment(fragment: &RawOcrFragment) -> Option<LedgerEntry> {
    let text = fragment.text();

    let amount = extract_amount(text);
    let notes = extract_notes(text);
    let name = extract_name(text);

    // A notes-only match (e.g. "大2") is not emitted
    if amount.is_empty() && name.is_empty() {
        return None;
    }

    Some(LedgerEntry {
        name,
        amount,
        notes,
        confidence: fragment.confidence(),
    })
}

/// First amount in the text, verbatim, without the `원`/`-` suffix.
///
/// A match lying wholly inside a guest-count marker ("大2") is not an amount.
pub fn extract_amount(text: &str) -> String {
    let note_spans: Vec<(usize, usize)> = re_note()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    re_amount()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find(|m| {
            !note_spans
                .iter()
                .any(|&(start, end)| start <= m.start() && m.end() <= end)
        })
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// All (marker, count) pairs in discovery order
pub fn extract_note_pairs(text: &str) -> Vec<(&str, &str)> {
    re_note()
        .captures_iter(text)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect()
}

/// Format (marker, count) pairs as "대 N인" / "소 N인", joined with ", ".
/// Pairs with an unrecognized marker are dropped.
pub fn format_notes(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .filter_map(|&(marker, count)| {
            let category = GuestCategory::from_marker(marker)?;
            Some(
                GuestNote {
                    category,
                    count: count.to_string(),
                }
                .to_string(),
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formatted guest-count notes found in the text
pub fn extract_notes(text: &str) -> String {
    format_notes(&extract_note_pairs(text))
}

/// First run of 2-4 Hangul syllables
pub fn extract_name(text: &str) -> String {
    re_name()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str) -> RawOcrFragment {
        RawOcrFragment::new(text, 0.87, vec![]).unwrap()
    }

    // ── amount ───────────────────────────────────────────────────────────────

    #[test]
    fn test_amount_with_won_suffix() {
        assert_eq!(extract_amount("100,000원"), "100,000");
        assert_eq!(extract_amount("50,000 원"), "50,000");
    }

    #[test]
    fn test_amount_keeps_trailing_comma() {
        assert_eq!(extract_amount("100,"), "100,");
        assert_eq!(extract_amount("100,원"), "100,");
        assert_eq!(extract_amount("30,000,-"), "30,000,");
    }

    #[test]
    fn test_amount_with_dash_suffix() {
        assert_eq!(extract_amount("50,000-"), "50,000");
    }

    #[test]
    fn test_amount_takes_first_match() {
        assert_eq!(extract_amount("김철수 30,000 50,000"), "30,000");
    }

    #[test]
    fn test_amount_without_grouping() {
        // An ungrouped run only matches its first three digits
        assert_eq!(extract_amount("100000"), "100");
    }

    #[test]
    fn test_amount_skips_guest_count_digits() {
        assert_eq!(extract_amount("大2"), "");
        assert_eq!(extract_amount("小 1 30,000"), "30,000");
        assert_eq!(extract_amount("김철수 50,000 大2"), "50,000");
    }

    #[test]
    fn test_amount_written_after_marker_is_kept() {
        assert_eq!(extract_amount("大12,000원"), "12,000");
        assert_eq!(extract_amount("김 大1,000"), "1,000");
        assert_eq!(extract_notes("大12,000원"), "대 12인");
    }

    #[test]
    fn test_amount_missing() {
        assert_eq!(extract_amount("홍길동"), "");
        assert_eq!(extract_amount(""), "");
    }

    // ── notes ────────────────────────────────────────────────────────────────

    #[test]
    fn test_notes_single_marker() {
        assert_eq!(extract_notes("大2"), "대 2인");
        assert_eq!(extract_notes("小 1"), "소 1인");
        assert_eq!(extract_notes("소3"), "소 3인");
    }

    #[test]
    fn test_notes_keep_source_order() {
        assert_eq!(extract_notes("小1 大2 소3"), "소 1인, 대 2인, 소 3인");
    }

    #[test]
    fn test_notes_require_digits() {
        assert_eq!(extract_notes("소영희"), "");
        assert_eq!(extract_notes("大"), "");
    }

    #[test]
    fn test_format_notes_drops_unknown_markers() {
        let pairs = [("中", "3"), ("大", "1"), ("x", "9")];
        assert_eq!(format_notes(&pairs), "대 1인");
        assert_eq!(format_notes(&[]), "");
    }

    // ── name ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_name_flanked_by_non_hangul() {
        for name in ["김구", "홍길동", "남궁민수"] {
            let text = format!("12 {}*", name);
            assert_eq!(extract_name(&text), name, "text: {}", text);
        }
    }

    #[test]
    fn test_name_single_syllable_is_ignored() {
        assert_eq!(extract_name("김 5"), "");
    }

    #[test]
    fn test_name_longer_run_is_cut_at_four() {
        assert_eq!(extract_name("가나다라마"), "가나다라");
    }

    #[test]
    fn test_name_first_match_wins() {
        assert_eq!(extract_name("홍길동 김철수"), "홍길동");
    }

    // ── entries ──────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_full_row() {
        let entry = parse_fragment(&fragment("홍길동 100,000원")).unwrap();
        assert_eq!(entry.name, "홍길동");
        assert_eq!(entry.amount, "100,000");
        assert_eq!(entry.notes, "");
        assert_eq!(entry.confidence, 0.87);
    }

    #[test]
    fn test_parse_row_with_notes() {
        let entry = parse_fragment(&fragment("김철수 50,000 大2 小1")).unwrap();
        assert_eq!(entry.name, "김철수");
        assert_eq!(entry.amount, "50,000");
        assert_eq!(entry.notes, "대 2인, 소 1인");
    }

    #[test]
    fn test_parse_name_only_and_amount_only() {
        let name_only = parse_fragment(&fragment("이영희")).unwrap();
        assert_eq!(name_only.amount, "");

        let amount_only = parse_fragment(&fragment("200,000")).unwrap();
        assert_eq!(amount_only.name, "");
        assert_eq!(amount_only.amount, "200,000");
    }

    #[test]
    fn test_notes_only_fragment_is_not_emitted() {
        assert_eq!(extract_notes("大2"), "대 2인");
        assert!(parse_fragment(&fragment("大2")).is_none());
    }

    #[test]
    fn test_empty_text_is_not_emitted() {
        assert!(parse_fragment(&fragment("")).is_none());
        assert!(parse_fragment(&fragment("  *  ")).is_none());
    }

    #[test]
    fn test_parse_fragments_keeps_order_and_skips_empty() {
        let fragments = vec![
            fragment("홍길동"),
            fragment("大1"),
            fragment("100,000"),
            fragment(""),
            fragment("김철수 30,000"),
        ];
        let entries = parse_fragments(&fragments);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "홍길동");
        assert_eq!(entries[1].amount, "100,000");
        assert_eq!(entries[2].name, "김철수");
        assert!(entries
            .iter()
            .all(|e| !e.name.is_empty() || !e.amount.is_empty()));
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let fragments = vec![fragment("홍길동 100,000원 大2"), fragment("5,000-")];
        assert_eq!(parse_fragments(&fragments), parse_fragments(&fragments));
    }
}
