use crate::moderation::MIN_DESCRIPTION_CHARS;
use crate::types::SubmissionDraft;
use crate::utils::{phone::validate_phone_number, text::is_blank};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    Title,
    Description,
    City,
    Topic,
    PublisherName,
    PublisherPhone,
}

/// Field-level problems found before a draft is sent for moderation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    errors: BTreeMap<DraftField, &'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: DraftField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &'static str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, *message))
    }

    fn insert(&mut self, field: DraftField, message: &'static str) {
        self.errors.insert(field, message);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.values().copied().collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Check required fields and formats the way the submission form does.
pub fn validate_draft(draft: &SubmissionDraft) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if is_blank(&draft.title) {
        errors.insert(DraftField::Title, "News title is required");
    }

    if is_blank(&draft.description) {
        errors.insert(DraftField::Description, "News description is required");
    } else if draft.description.chars().count() < MIN_DESCRIPTION_CHARS {
        errors.insert(
            DraftField::Description,
            "Description must be at least 50 characters",
        );
    }

    if is_blank(&draft.city) {
        errors.insert(DraftField::City, "City is required");
    }

    if is_blank(&draft.topic) {
        errors.insert(DraftField::Topic, "Topic/Category is required");
    }

    if is_blank(&draft.publisher_name) {
        errors.insert(DraftField::PublisherName, "Publisher first name is required");
    }

    if is_blank(&draft.publisher_phone) {
        errors.insert(DraftField::PublisherPhone, "Publisher phone number is required");
    } else if !validate_phone_number(&draft.publisher_phone) {
        errors.insert(
            DraftField::PublisherPhone,
            "Please enter a valid 10-digit phone number",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
