//! Contact card rules: name, email, and phone searched across the whole text.

use regex::Regex;

use super::patterns::PHONE;
use super::{Field, FieldMatch, FieldRule};

/// Field filled by every non-overlapping match of a regex.
pub struct PatternRule {
    field: Field,
    pattern: &'static Regex,
}

impl PatternRule {
    pub fn new(field: Field, pattern: &'static Regex) -> Self {
        Self { field, pattern }
    }
}

impl FieldRule for PatternRule {
    fn field(&self) -> Field {
        self.field
    }

    fn extract_all(&self, text: &str) -> Vec<FieldMatch> {
        self.pattern
            .find_iter(text)
            .map(|m| FieldMatch::new(m.as_str(), m.as_str(), m.start(), m.end()))
            .collect()
    }
}

/// Phone numbers in a 2-3/5/5 digit grouping.
///
/// A match must not touch another digit on either side, and a number written
/// without any separator must be exactly 12 digits long.
pub struct PhoneRule;

impl FieldRule for PhoneRule {
    fn field(&self) -> Field {
        Field::Phone
    }

    fn extract_all(&self, text: &str) -> Vec<FieldMatch> {
        let mut results = Vec::new();
        let mut start = 0;

        while start <= text.len() {
            let Some(caps) = PHONE.captures_at(text, start) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            let prefix_len = caps.get(1).map_or(0, |m| m.len());
            let separated = caps.get(2).is_some_and(|m| !m.is_empty())
                || caps.get(3).is_some_and(|m| !m.is_empty());

            if is_digit_bounded(text, whole.start(), whole.end()) && (separated || prefix_len == 2) {
                results.push(FieldMatch::new(
                    whole.as_str(),
                    whole.as_str(),
                    whole.start(),
                    whole.end(),
                ));
                start = whole.end();
            } else {
                // Matches start on '+' or an ASCII digit, both one byte wide.
                start = whole.start() + 1;
            }
        }

        results
    }
}

fn is_digit_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
}
