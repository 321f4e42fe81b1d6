//! Field extraction from recognized card text.
//!
//! A [`FieldExtractor`] applies the rules of one [`ExtractionProfile`] to the
//! full OCR output and always yields a complete [`ExtractedRecord`]. Fields
//! without a usable match hold an empty string; extraction never fails.

pub mod code_pair;
pub mod contact;
pub mod patterns;

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::record::ExtractedRecord;

pub use code_pair::{LabeledLineRule, LineValue};
pub use contact::{PatternRule, PhoneRule};

/// A structured field that can be pulled from a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Spid,
    Contact,
}

impl Field {
    /// Lowercase key used in serialized records.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Spid => "spid",
            Field::Contact => "contact",
        }
    }

    /// Label shown in the details table.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Spid => "SPID",
            Field::Contact => "Contact",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Named set of rules mapping free text to a fixed set of fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionProfile {
    /// Name, email, and phone from a contact card.
    #[default]
    ContactCard,
    /// SPID and contact codes, read line by line.
    CodePair,
}

impl ExtractionProfile {
    /// Fields produced by this profile, in display order.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            ExtractionProfile::ContactCard => &[Field::Name, Field::Email, Field::Phone],
            ExtractionProfile::CodePair => &[Field::Spid, Field::Contact],
        }
    }

    /// Matching policy the profile uses unless overridden.
    pub fn default_policy(&self) -> MatchPolicy {
        match self {
            ExtractionProfile::ContactCard => MatchPolicy::First,
            ExtractionProfile::CodePair => MatchPolicy::Last,
        }
    }

    /// Whether empty fields are hidden when the record is displayed.
    pub fn hides_empty_fields(&self) -> bool {
        matches!(self, ExtractionProfile::CodePair)
    }

    fn rules(&self) -> &'static [Box<dyn FieldRule>] {
        match self {
            ExtractionProfile::ContactCard => &*CONTACT_CARD_RULES,
            ExtractionProfile::CodePair => &*CODE_PAIR_RULES,
        }
    }
}

impl fmt::Display for ExtractionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionProfile::ContactCard => write!(f, "contact_card"),
            ExtractionProfile::CodePair => write!(f, "code_pair"),
        }
    }
}

impl FromStr for ExtractionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "contact_card" | "contact" | "card" => Ok(ExtractionProfile::ContactCard),
            "code_pair" | "spid" => Ok(ExtractionProfile::CodePair),
            other => Err(format!("unknown extraction profile: {}", other)),
        }
    }
}

/// Which match wins when a field matches more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The earliest match in the text.
    First,
    /// The latest match in the text.
    Last,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::First => write!(f, "first"),
            MatchPolicy::Last => write!(f, "last"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(MatchPolicy::First),
            "last" => Ok(MatchPolicy::Last),
            other => Err(format!("unknown match policy: {}", other)),
        }
    }
}

/// A single match of a field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    /// Extracted value, never empty.
    pub value: String,
    /// Text the value was taken from.
    pub source: String,
    /// Byte range of the source in the input text.
    pub position: (usize, usize),
}

impl FieldMatch {
    pub fn new(value: impl Into<String>, source: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
            position: (start, end),
        }
    }
}

/// Rule extracting one field.
pub trait FieldRule: Send + Sync {
    /// The field this rule fills.
    fn field(&self) -> Field;

    /// Every match in the text, in text order.
    fn extract_all(&self, text: &str) -> Vec<FieldMatch>;
}

lazy_static! {
    static ref CONTACT_CARD_RULES: Vec<Box<dyn FieldRule>> = vec![
        Box::new(PatternRule::new(Field::Name, &patterns::NAME)),
        Box::new(PatternRule::new(Field::Email, &patterns::EMAIL)),
        Box::new(PhoneRule),
    ];

    static ref CODE_PAIR_RULES: Vec<Box<dyn FieldRule>> = vec![
        Box::new(LabeledLineRule::new(Field::Spid, "spid", "SPID:", LineValue::FirstDigitRun)),
        Box::new(LabeledLineRule::new(Field::Contact, "contact", "Contact:", LineValue::DigitsOnly)),
    ];
}

/// Maps recognized text to a structured record using one profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldExtractor {
    profile: ExtractionProfile,
    policy: MatchPolicy,
}

impl FieldExtractor {
    /// Create an extractor using the profile's default policy.
    pub fn new(profile: ExtractionProfile) -> Self {
        Self {
            profile,
            policy: profile.default_policy(),
        }
    }

    /// Override the matching policy for every field.
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Profile in use.
    pub fn profile(&self) -> ExtractionProfile {
        self.profile
    }

    /// Policy in use.
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Extract every field of the profile from the text.
    pub fn extract(&self, text: &str) -> ExtractedRecord {
        let mut record = ExtractedRecord::empty(self.profile);

        for rule in self.profile.rules() {
            let matches = rule.extract_all(text);
            let chosen = match self.policy {
                MatchPolicy::First => matches.into_iter().next(),
                MatchPolicy::Last => matches.into_iter().last(),
            };

            if let Some(m) = chosen {
                debug!(
                    "Matched {} at {}..{}: {:?}",
                    rule.field(),
                    m.position.0,
                    m.position.1,
                    m.value
                );
                record.set(rule.field(), m.value);
            }
        }

        record
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(ExtractionProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(profile: ExtractionProfile, fields: &[(Field, &str)]) -> ExtractedRecord {
        let mut record = ExtractedRecord::empty(profile);
        for (field, value) in fields {
            record.set(*field, value.to_string());
        }
        record
    }

    #[test]
    fn test_contact_card_scenario() {
        let text = "John Smith\nContact me at john.smith@example.com or +91 98765 43210";
        let extracted = FieldExtractor::new(ExtractionProfile::ContactCard).extract(text);

        assert_eq!(
            extracted,
            record(
                ExtractionProfile::ContactCard,
                &[
                    (Field::Name, "John Smith"),
                    (Field::Email, "john.smith@example.com"),
                    (Field::Phone, "+91 98765 43210"),
                ]
            )
        );
    }

    #[test]
    fn test_contact_card_no_matches() {
        let extracted = FieldExtractor::new(ExtractionProfile::ContactCard).extract("####");

        assert_eq!(extracted.get(Field::Name), Some(""));
        assert_eq!(extracted.get(Field::Email), Some(""));
        assert_eq!(extracted.get(Field::Phone), Some(""));
        assert_eq!(extracted.get(Field::Spid), None);
    }

    #[test]
    fn test_code_pair_scenario() {
        let extracted =
            FieldExtractor::new(ExtractionProfile::CodePair).extract("SPID: 12345\nContact: 987-654-3210");

        assert_eq!(
            extracted,
            record(
                ExtractionProfile::CodePair,
                &[(Field::Spid, "12345"), (Field::Contact, "9876543210")]
            )
        );
    }

    #[test]
    fn test_code_pair_last_match_wins() {
        let extracted = FieldExtractor::new(ExtractionProfile::CodePair).extract("SPID: 111\nSPID: 222");

        assert_eq!(extracted.get(Field::Spid), Some("222"));
        assert_eq!(extracted.get(Field::Contact), Some(""));
    }

    #[test]
    fn test_policy_override() {
        let text = "SPID: 111\nSPID: 222";
        let first = FieldExtractor::new(ExtractionProfile::CodePair)
            .with_policy(MatchPolicy::First)
            .extract(text);
        assert_eq!(first.get(Field::Spid), Some("111"));

        let text = "Jane Doe\nAcme Corp";
        let last = FieldExtractor::new(ExtractionProfile::ContactCard)
            .with_policy(MatchPolicy::Last)
            .extract(text);
        assert_eq!(last.get(Field::Name), Some("Acme Corp"));
    }

    #[test]
    fn test_empty_candidates_do_not_overwrite() {
        // The trailing SPID line carries no digits.
        let text = "SPID: 4711\nContact: 555 1234\nspid unreadable\nContact us";
        let extracted = FieldExtractor::new(ExtractionProfile::CodePair).extract(text);

        assert_eq!(extracted.get(Field::Spid), Some("4711"));
        assert_eq!(extracted.get(Field::Contact), Some("5551234"));
    }

    #[test]
    fn test_extraction_is_pure() {
        let text = "Ann Lee ann@lee.io 44 12345 67890\nSPID: 9\nContact: 1";
        for profile in [ExtractionProfile::ContactCard, ExtractionProfile::CodePair] {
            let extractor = FieldExtractor::new(profile);
            assert_eq!(extractor.extract(text), extractor.extract(text));
        }
    }

    #[test]
    fn test_noisy_input_never_panics() {
        let inputs = [
            "",
            "\n\n\n",
            "spid",
            "SPID:",
            "contact:::---",
            "\u{0}\u{fffd}@@.. +++ 12",
            "ŻÓŁĆ spid ٣٤٥ contact ١٢٣",
            "@a.b +1-23456-78901-2",
        ];

        for input in inputs {
            for profile in [ExtractionProfile::ContactCard, ExtractionProfile::CodePair] {
                let record = FieldExtractor::new(profile).extract(input);
                assert_eq!(record.iter().count(), profile.fields().len());
            }
        }
    }

    #[test]
    fn test_values_match_declared_patterns() {
        let text = "Mr Bond, agent: j.bond@mi6.gov.uk\nTel 44-20123-45678";
        let extracted = FieldExtractor::new(ExtractionProfile::ContactCard).extract(text);

        for (field, value) in extracted.iter() {
            let pattern = match field {
                Field::Name => &*patterns::NAME,
                Field::Email => &*patterns::EMAIL,
                Field::Phone => &*patterns::PHONE,
                _ => unreachable!(),
            };
            assert!(value.is_empty() || pattern.is_match(value), "{}: {}", field, value);
        }
        assert_eq!(extracted.get(Field::Phone), Some("44-20123-45678"));
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("code-pair".parse::<ExtractionProfile>(), Ok(ExtractionProfile::CodePair));
        assert_eq!("contact_card".parse::<ExtractionProfile>(), Ok(ExtractionProfile::ContactCard));
        assert!("invoice".parse::<ExtractionProfile>().is_err());
        assert_eq!("LAST".parse::<MatchPolicy>(), Ok(MatchPolicy::Last));
    }
}
