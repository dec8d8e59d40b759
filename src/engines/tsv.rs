//! Tesseract TSV output grouped into text lines

use crate::engine::{Point, RawOcrFragment};
use crate::error::LedgerError;

/// TSV level of a single word
const WORD_LEVEL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineKey {
    page: u32,
    block: u32,
    paragraph: u32,
    line: u32,
}

struct LineAccumulator {
    key: LineKey,
    words: Vec<String>,
    confidences: Vec<f32>,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl LineAccumulator {
    fn into_fragment(self) -> Result<Option<RawOcrFragment>, LedgerError> {
        let text = self.words.join(" ");
        if text.is_empty() {
            return Ok(None);
        }

        let confidence = if self.confidences.is_empty() {
            0.0
        } else {
            let mean = self.confidences.iter().sum::<f32>() / self.confidences.len() as f32;
            (mean / 100.0).clamp(0.0, 1.0)
        };

        let (l, t, r, b) = (
            self.left as f32,
            self.top as f32,
            self.right as f32,
            self.bottom as f32,
        );
        let polygon = vec![Point::new(l, t), Point::new(r, t), Point::new(r, b), Point::new(l, b)];

        RawOcrFragment::new(text, confidence, polygon).map(Some)
    }
}

/// Group word rows of Tesseract TSV into one fragment per text line.
///
/// Lines come out in Tesseract's reading order. Each fragment's confidence is
/// the mean of its words' confidences (words reported as -1 are ignored) and
/// its polygon is the union of the word boxes. Header and malformed rows are
/// skipped.
pub fn parse_tsv_lines(tsv: &str) -> Result<Vec<RawOcrFragment>, LedgerError> {
    let mut lines: Vec<LineAccumulator> = Vec::new();

    for row in tsv.lines() {
        let Some(word) = parse_word_row(row) else {
            continue;
        };
        let (key, left, top, width, height, conf, text) = word;
        if text.is_empty() {
            continue;
        }

        let same_line = lines.last().is_some_and(|last| last.key == key);
        if !same_line {
            lines.push(LineAccumulator {
                key,
                words: Vec::new(),
                confidences: Vec::new(),
                left,
                top,
                right: left + width,
                bottom: top + height,
            });
        }

        if let Some(acc) = lines.last_mut() {
            acc.words.push(text.to_string());
            if conf >= 0.0 {
                acc.confidences.push(conf);
            }
            acc.left = acc.left.min(left);
            acc.top = acc.top.min(top);
            acc.right = acc.right.max(left + width);
            acc.bottom = acc.bottom.max(top + height);
        }
    }

    let mut fragments = Vec::with_capacity(lines.len());
    for acc in lines {
        if let Some(fragment) = acc.into_fragment()? {
            fragments.push(fragment);
        }
    }
    Ok(fragments)
}

type WordRow<'a> = (LineKey, i64, i64, i64, i64, f32, &'a str);

fn parse_word_row(row: &str) -> Option<WordRow<'_>> {
    // Tesseract never quotes the text column, so a plain tab split is exact
    let fields: Vec<&str> = row.splitn(12, '\t').collect();
    if fields.len() < 11 {
        return None;
    }

    let level: u32 = fields[0].trim().parse().ok()?;
    if level != WORD_LEVEL {
        return None;
    }

    let key = LineKey {
        page: fields[1].trim().parse().ok()?,
        block: fields[2].trim().parse().ok()?,
        paragraph: fields[3].trim().parse().ok()?,
        line: fields[4].trim().parse().ok()?,
    };
    let left = fields[6].trim().parse().ok()?;
    let top = fields[7].trim().parse().ok()?;
    let width = fields[8].trim().parse().ok()?;
    let height = fields[9].trim().parse().ok()?;
    let conf = fields[10].trim().parse().ok()?;
    let text = fields.get(11).map(|t| t.trim()).unwrap_or("");

    Some((key, left, top, width, height, conf, text))
}
