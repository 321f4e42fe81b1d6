//! Code pair rules: labeled values read one line at a time.

use super::patterns::DIGIT_RUN;
use super::{Field, FieldMatch, FieldRule};

/// How the value is taken from a labeled line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineValue {
    /// The first maximal run of digits.
    FirstDigitRun,
    /// Every digit on the line, concatenated.
    DigitsOnly,
}

/// Field read from lines mentioning a keyword.
///
/// The keyword test is case-insensitive; the label removed before reading the
/// value is matched exactly as written on the card.
pub struct LabeledLineRule {
    field: Field,
    keyword: &'static str,
    label: &'static str,
    value: LineValue,
}

impl LabeledLineRule {
    pub fn new(field: Field, keyword: &'static str, label: &'static str, value: LineValue) -> Self {
        Self {
            field,
            keyword,
            label,
            value,
        }
    }

    fn read_value(&self, line: &str) -> String {
        let rest = line.replacen(self.label, "", 1);
        let rest = rest.trim();

        match self.value {
            LineValue::FirstDigitRun => DIGIT_RUN
                .find(rest)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            LineValue::DigitsOnly => rest.chars().filter(|c| c.is_ascii_digit()).collect(),
        }
    }
}

impl FieldRule for LabeledLineRule {
    fn field(&self) -> Field {
        self.field
    }

    fn extract_all(&self, text: &str) -> Vec<FieldMatch> {
        let mut results = Vec::new();
        let mut offset = 0;

        for line in text.split('\n') {
            let start = offset;
            offset += line.len() + 1;

            if !line.to_lowercase().contains(self.keyword) {
                continue;
            }

            // Lines without a usable value are skipped.
            let value = self.read_value(line);
            if !value.is_empty() {
                results.push(FieldMatch::new(value, line, start, start + line.len()));
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spid_rule() -> LabeledLineRule {
        LabeledLineRule::new(Field::Spid, "spid", "SPID:", LineValue::FirstDigitRun)
    }

    fn contact_rule() -> LabeledLineRule {
        LabeledLineRule::new(Field::Contact, "contact", "Contact:", LineValue::DigitsOnly)
    }

    #[test]
    fn test_spid_first_digit_run() {
        let matches = spid_rule().extract_all("SPID: 123 / 456");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, "123");
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let matches = spid_rule().extract_all("header\nspid no. 0042\nfooter");
        assert_eq!(matches[0].value, "0042");
        assert_eq!(matches[0].source, "spid no. 0042");
        assert_eq!(matches[0].position, (7, 20));
    }

    #[test]
    fn test_label_strip_is_case_sensitive() {
        // "spid:" stays on the line but does not affect the digits.
        let matches = spid_rule().extract_all("spid:77");
        assert_eq!(matches[0].value, "77");
    }

    #[test]
    fn test_contact_keeps_only_digits() {
        let matches = contact_rule().extract_all("Contact: +1 (555) 010-9999\r");
        assert_eq!(matches[0].value, "15550109999");
    }

    #[test]
    fn test_lines_without_digits_are_skipped() {
        assert!(spid_rule().extract_all("SPID: n/a").is_empty());
        assert!(contact_rule().extract_all("CONTACT US").is_empty());
    }

    #[test]
    fn test_all_matching_lines_in_order() {
        let values: Vec<String> = spid_rule()
            .extract_all("SPID: 1\nnothing\nSPID: 2\nSPID: 3")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }
}
