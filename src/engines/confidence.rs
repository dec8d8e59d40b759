//! Confidence scoring for engines that don't report one
//!
//! ocrs gives no per-line scores, so a recognized ledger line is judged by how
//! much it looks like "name, amount, note" text instead of recognizer noise.

/// Score a single recognized line, 0.0 (garbage) to 1.0 (clean)
pub fn line_confidence(text: &str) -> f32 {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return 0.0;
    }
    if len == 1 {
        return 0.3; // A lone character is rarely a ledger field
    }

    let char_score = analyze_char_classes(trimmed);
    let token_score = analyze_token_lengths(trimmed);
    let repetition_score = detect_repetition(trimmed);

    let confidence = 0.5 * char_score + 0.3 * token_score + 0.2 * repetition_score;
    confidence.clamp(0.0, 1.0)
}

/// Penalize symbols that never appear in a ledger line.
///
/// Letters (Hangul and Hanja included) and digits are expected; commas,
/// dashes and spaces are neutral; anything else counts against the line.
fn analyze_char_classes(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let content = text.chars().filter(|c| c.is_alphanumeric()).count();
    let stray = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !matches!(c, ',' | '-' | '.'))
        .count();

    let stray_ratio = stray as f32 / total as f32;
    let stray_penalty = 1.0 - (stray_ratio * 5.0).min(1.0);

    let content_ratio = content as f32 / total as f32;
    let content_score = (content_ratio * 1.25).min(1.0);

    stray_penalty * 0.6 + content_score * 0.4
}

/// Ledger tokens are short: 2-4 syllable names, grouped amounts, 大2-style notes
fn analyze_token_lengths(text: &str) -> f32 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.5;
    }

    let total_len: usize = tokens.iter().map(|t| t.chars().count()).sum();
    let avg_len = total_len as f32 / tokens.len() as f32;

    let avg_score = match avg_len as usize {
        0..=1 => 0.4,
        2..=8 => 1.0,
        9..=12 => 0.7,
        _ => 0.4,
    };

    let single_count = tokens.iter().filter(|t| t.chars().count() == 1).count();
    let single_ratio = single_count as f32 / tokens.len() as f32;
    let single_penalty = 1.0 - (single_ratio * 1.5).min(0.5);

    avg_score * single_penalty
}

/// Long runs of one character ("0000000", "||||") usually mean the recognizer
/// lost track of the stroke
fn detect_repetition(text: &str) -> f32 {
    let mut max_repeat = 1;
    let mut current = 1;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if Some(c) == prev && !c.is_whitespace() {
            current += 1;
            max_repeat = max_repeat.max(current);
        } else {
            current = 1;
        }
        prev = Some(c);
    }

    // "100,000" has a run of three zeros, "1,000,000" never more than three
    match max_repeat {
        1..=3 => 1.0,
        4..=5 => 0.8,
        6..=10 => 0.5,
        _ => 0.2,
    }
}
