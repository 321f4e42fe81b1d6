//! Assembly of detected text regions into document text.

use std::cmp::Ordering;

use super::EngineMode;

/// A recognized text region with its axis-aligned bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// Recognized text.
    pub text: String,
    /// Bounds as (min_x, min_y, max_x, max_y).
    pub rect: (f32, f32, f32, f32),
    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    pub fn new(text: impl Into<String>, rect: (f32, f32, f32, f32), confidence: f32) -> Self {
        Self {
            text: text.into(),
            rect,
            confidence,
        }
    }

    fn center_y(&self) -> f32 {
        (self.rect.1 + self.rect.3) / 2.0
    }
}

/// Join text regions into newline separated text in reading order
/// (top to bottom, then left to right).
pub fn assemble_text(mut boxes: Vec<TextBox>, mode: EngineMode) -> String {
    boxes.retain(|b| !b.text.trim().is_empty());
    boxes.sort_by(|a, b| {
        a.rect
            .1
            .partial_cmp(&b.rect.1)
            .unwrap_or(Ordering::Equal)
            .then(a.rect.0.partial_cmp(&b.rect.0).unwrap_or(Ordering::Equal))
    });

    let mut rows: Vec<Vec<TextBox>> = Vec::new();
    for text_box in boxes {
        let joins_row = mode == EngineMode::ReadingOrder
            && rows.last().and_then(|row| row.first()).is_some_and(|first| {
                let center = text_box.center_y();
                center >= first.rect.1 && center <= first.rect.3
            });

        match rows.last_mut() {
            Some(row) if joins_row => row.push(text_box),
            _ => rows.push(vec![text_box]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| a.rect.0.partial_cmp(&b.rect.0).unwrap_or(Ordering::Equal));
            row.iter()
                .map(|b| b.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Vec<TextBox> {
        vec![
            TextBox::new("john@acme.io", (10.0, 60.0, 120.0, 80.0), 0.9),
            TextBox::new("Smith", (70.0, 12.0, 130.0, 38.0), 0.9),
            TextBox::new("John", (10.0, 10.0, 60.0, 40.0), 0.9),
            TextBox::new("  ", (0.0, 100.0, 5.0, 110.0), 0.1),
        ]
    }

    #[test]
    fn test_no_layout_analysis_one_region_per_line() {
        assert_eq!(
            assemble_text(card(), EngineMode::NoLayoutAnalysis),
            "John\nSmith\njohn@acme.io"
        );
    }

    #[test]
    fn test_reading_order_merges_rows() {
        assert_eq!(
            assemble_text(card(), EngineMode::ReadingOrder),
            "John Smith\njohn@acme.io"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(assemble_text(Vec::new(), EngineMode::ReadingOrder), "");
    }
}
