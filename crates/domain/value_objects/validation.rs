use std::collections::BTreeMap;
use std::fmt::Display;

use crate::domain::value_objects::{
    candidates::{CandidateFields, DocumentFile, parse_experience},
    enums::scalar_fields::ScalarField,
    submission_contract::{MAX_RESUME_BYTES, RESUME_MIME_TYPE, RESUME_PART},
};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Value must contain a non-whitespace character.
    Required(&'static str),
    /// Value must parse as a finite number.
    Numeric(&'static str),
}

impl FieldRule {
    fn check(&self, value: &str) -> Result<(), &'static str> {
        match self {
            FieldRule::Required(message) => {
                if value.trim().is_empty() {
                    return Err(*message);
                }
            }
            FieldRule::Numeric(message) => {
                if !matches!(parse_experience(value), Ok(Some(_))) {
                    return Err(*message);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRule {
    pub required_message: &'static str,
    pub content_type: &'static str,
    pub content_type_message: &'static str,
    pub max_bytes: u64,
    pub max_bytes_message: &'static str,
}

impl DocumentRule {
    fn check(&self, document: Option<&DocumentFile>) -> Result<(), &'static str> {
        let Some(document) = document else {
            return Err(self.required_message);
        };

        if !mime_matches(&document.content_type, self.content_type) {
            return Err(self.content_type_message);
        }
        if document.size_bytes() > self.max_bytes {
            return Err(self.max_bytes_message);
        }
        Ok(())
    }
}

/// Per-field error messages keyed by part name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Validation rules for the intake form, applied uniformly to every field.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRules {
    fields: BTreeMap<ScalarField, Vec<FieldRule>>,
    document: DocumentRule,
}

impl Default for CandidateRules {
    fn default() -> Self {
        let fields = BTreeMap::from([
            (
                ScalarField::FirstName,
                vec![FieldRule::Required("First name is required")],
            ),
            (
                ScalarField::LastName,
                vec![FieldRule::Required("Last name is required")],
            ),
            (
                ScalarField::Position,
                vec![FieldRule::Required("Position is required")],
            ),
            (
                ScalarField::CurrentPosition,
                vec![FieldRule::Required("Current position is required")],
            ),
            (
                ScalarField::Experience,
                vec![
                    FieldRule::Required("Experience (in years) is required"),
                    FieldRule::Numeric("Experience (in years) is required"),
                ],
            ),
        ]);

        Self {
            fields,
            document: DocumentRule {
                required_message: "Resume is required",
                content_type: RESUME_MIME_TYPE,
                content_type_message: "Only PDF files are allowed",
                max_bytes: MAX_RESUME_BYTES,
                max_bytes_message: "File size must not exceed 5 MB",
            },
        }
    }
}

impl CandidateRules {
    pub fn rules_for(&self, field: ScalarField) -> &[FieldRule] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validate_fields(&self, fields: &CandidateFields) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for (field, rules) in &self.fields {
            let value = fields.get(*field);
            if let Some(message) = rules.iter().find_map(|rule| rule.check(value).err()) {
                errors.insert(field.part_name(), message);
            }
        }
        errors
    }

    pub fn validate_document(&self, document: Option<&DocumentFile>) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if let Err(message) = self.document.check(document) {
            errors.insert(RESUME_PART, message);
        }
        errors
    }

    /// Checks every field and the résumé, collecting one message per field.
    pub fn validate(
        &self,
        fields: &CandidateFields,
        document: Option<&DocumentFile>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = self.validate_fields(fields);
        for (field, message) in self.validate_document(document).iter() {
            errors.insert(field, message);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn mime_matches(declared: &str, expected: &str) -> bool {
    declared
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn complete_fields() -> CandidateFields {
        CandidateFields {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            position: "Engineer".to_string(),
            current_position: "Analyst".to_string(),
            experience: "7".to_string(),
        }
    }

    fn pdf(size: usize) -> DocumentFile {
        DocumentFile {
            file_name: "cv.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn accepts_complete_submission() {
        let rules = CandidateRules::default();
        assert!(rules.validate(&complete_fields(), Some(&pdf(1024))).is_ok());
    }

    #[test]
    fn reports_each_blank_field_once() {
        let rules = CandidateRules::default();
        let fields = CandidateFields {
            first_name: "  ".to_string(),
            experience: String::new(),
            ..complete_fields()
        };

        let errors = rules.validate(&fields, Some(&pdf(10))).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("firstName"), Some("First name is required"));
        assert_eq!(
            errors.get("experience"),
            Some("Experience (in years) is required")
        );
    }

    #[test]
    fn rejects_non_numeric_experience() {
        let rules = CandidateRules::default();
        let fields = CandidateFields {
            experience: "a few".to_string(),
            ..complete_fields()
        };

        let errors = rules.validate_fields(&fields);
        assert!(errors.get("experience").is_some());
    }

    #[test]
    fn requires_resume() {
        let rules = CandidateRules::default();
        let errors = rules.validate(&complete_fields(), None).unwrap_err();
        assert_eq!(errors.get("resume"), Some("Resume is required"));
    }

    #[test]
    fn rejects_non_pdf_resume() {
        let rules = CandidateRules::default();
        let document = DocumentFile {
            content_type: "image/png".to_string(),
            ..pdf(10)
        };

        let errors = rules.validate_document(Some(&document));
        assert_eq!(errors.get("resume"), Some("Only PDF files are allowed"));
    }

    #[test]
    fn accepts_pdf_with_parameters() {
        let rules = CandidateRules::default();
        let document = DocumentFile {
            content_type: "Application/PDF; qs=0.9".to_string(),
            ..pdf(10)
        };

        assert!(rules.validate_document(Some(&document)).is_empty());
    }

    #[test]
    fn rejects_oversized_resume() {
        let rules = CandidateRules::default();
        let errors = rules.validate_document(Some(&pdf(5 * 1024 * 1024 + 1)));
        assert_eq!(errors.get("resume"), Some("File size must not exceed 5 MB"));
    }

    #[test]
    fn resume_at_limit_is_allowed() {
        let rules = CandidateRules::default();
        assert!(rules.validate_document(Some(&pdf(5 * 1024 * 1024))).is_empty());
    }
}
