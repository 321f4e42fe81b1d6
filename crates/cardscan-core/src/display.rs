//! Two-column key/value view of scan results.

use std::fmt;

use serde::Serialize;

use crate::models::record::ExtractedRecord;
use crate::ocr::RecognizedText;

/// Rows shown under "Scanned Details".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailsTable {
    rows: Vec<(String, String)>,
}

impl DetailsTable {
    /// Rows for an extracted record.
    ///
    /// Profiles that hide empty fields only list fields that matched.
    pub fn from_record(record: &ExtractedRecord) -> Self {
        let hide_empty = record.profile.hides_empty_fields();
        let rows = record
            .iter()
            .filter(|(_, value)| !(hide_empty && value.is_empty()))
            .map(|(field, value)| (format!("{}:", field.label()), value.to_string()))
            .collect();

        Self { rows }
    }

    /// One row per non-empty line of raw recognized text, with an empty key.
    pub fn from_text(text: &RecognizedText) -> Self {
        let rows = text
            .non_empty_lines()
            .map(|line| (String::new(), line.to_string()))
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for DetailsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key_width = self.rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);

        for (key, value) in &self.rows {
            if key_width == 0 {
                writeln!(f, "{}", value)?;
            } else {
                writeln!(f, "{:<width$}  {}", key, value, width = key_width)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractionProfile, FieldExtractor};

    #[test]
    fn test_contact_card_shows_every_field() {
        let record = FieldExtractor::new(ExtractionProfile::ContactCard).extract("Jane Roe");
        let table = DetailsTable::from_record(&record);

        assert_eq!(table.rows().len(), 3);
        assert_eq!(
            table.to_string(),
            "Name:   Jane Roe\nEmail:  \nPhone:  \n"
        );
    }

    #[test]
    fn test_code_pair_hides_empty_fields() {
        let record = FieldExtractor::new(ExtractionProfile::CodePair).extract("SPID: 12");
        let table = DetailsTable::from_record(&record);

        assert_eq!(
            table.rows(),
            &[("SPID:".to_string(), "12".to_string())]
        );
    }

    #[test]
    fn test_raw_text_drops_blank_lines() {
        let table = DetailsTable::from_text(&RecognizedText::from("ACME\n\nJohn Smith\n"));

        assert_eq!(table.to_string(), "ACME\nJohn Smith\n");
    }

    #[test]
    fn test_empty_table() {
        let record = FieldExtractor::new(ExtractionProfile::CodePair).extract("");
        assert!(DetailsTable::from_record(&record).is_empty());
    }
}
