//! Structured record extracted from one scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extract::{ExtractionProfile, Field};

/// Field values extracted from recognized text.
///
/// Every field of the profile is present; fields without a match hold an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Profile that produced the record.
    pub profile: ExtractionProfile,

    /// Values keyed by field.
    fields: BTreeMap<Field, String>,
}

impl ExtractedRecord {
    /// Record with every field of the profile set to the empty string.
    pub fn empty(profile: ExtractionProfile) -> Self {
        Self {
            profile,
            fields: profile
                .fields()
                .iter()
                .map(|f| (*f, String::new()))
                .collect(),
        }
    }

    /// Set a field value. Fields outside the profile are ignored.
    pub(crate) fn set(&mut self, field: Field, value: String) {
        if let Some(slot) = self.fields.get_mut(&field) {
            *slot = value;
        }
    }

    /// Value of a field, or `None` if the field is not part of the profile.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Fields and values in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Number of fields holding a value.
    pub fn filled(&self) -> usize {
        self.fields.values().filter(|v| !v.is_empty()).count()
    }

    /// Whether no field matched.
    pub fn is_blank(&self) -> bool {
        self.filled() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_profile_fields() {
        let record = ExtractedRecord::empty(ExtractionProfile::CodePair);
        let fields: Vec<Field> = record.iter().map(|(f, _)| f).collect();

        assert_eq!(fields, vec![Field::Spid, Field::Contact]);
        assert!(record.is_blank());
        assert_eq!(record.get(Field::Name), None);
    }

    #[test]
    fn test_set_ignores_foreign_fields() {
        let mut record = ExtractedRecord::empty(ExtractionProfile::ContactCard);
        record.set(Field::Spid, "1".to_string());
        record.set(Field::Email, "a@b.io".to_string());

        assert_eq!(record.get(Field::Spid), None);
        assert_eq!(record.filled(), 1);
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut record = ExtractedRecord::empty(ExtractionProfile::CodePair);
        record.set(Field::Spid, "12345".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "profile": "code_pair",
                "fields": { "spid": "12345", "contact": "" }
            })
        );

        let back: ExtractedRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
