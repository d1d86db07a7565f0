use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::domain::value_objects::submission_contract::{
    CURRENT_POSITION_FIELD, EXPERIENCE_FIELD, FIRST_NAME_FIELD, LAST_NAME_FIELD, POSITION_FIELD,
};

/// Text part of a candidate submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarField {
    FirstName,
    LastName,
    Position,
    CurrentPosition,
    Experience,
}

impl ScalarField {
    /// Wire order used when a payload is assembled.
    pub const ALL: [ScalarField; 5] = [
        ScalarField::FirstName,
        ScalarField::LastName,
        ScalarField::Position,
        ScalarField::CurrentPosition,
        ScalarField::Experience,
    ];

    pub fn part_name(self) -> &'static str {
        match self {
            ScalarField::FirstName => FIRST_NAME_FIELD,
            ScalarField::LastName => LAST_NAME_FIELD,
            ScalarField::Position => POSITION_FIELD,
            ScalarField::CurrentPosition => CURRENT_POSITION_FIELD,
            ScalarField::Experience => EXPERIENCE_FIELD,
        }
    }

    pub fn from_part_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.part_name() == name)
    }
}

impl Display for ScalarField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.part_name())
    }
}
