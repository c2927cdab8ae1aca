//! LegacyField - Denormalized list fields on the user profile document
//!
//! Older consumers read plain string arrays instead of memory records.
//! Each field mirrors the values of one memory kind.

use serde::{Deserialize, Serialize};

/// One of the four legacy aggregate list fields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LegacyField {
    PreferredExerciseTypes,
    AvoidedExerciseTypes,
    PreferredMealTypes,
    AvoidedMealIngredients,
}

impl LegacyField {
    pub const ALL: [LegacyField; 4] = [
        LegacyField::PreferredExerciseTypes,
        LegacyField::AvoidedExerciseTypes,
        LegacyField::PreferredMealTypes,
        LegacyField::AvoidedMealIngredients,
    ];

    /// Field name on the profile document
    pub fn field_name(&self) -> &'static str {
        match self {
            LegacyField::PreferredExerciseTypes => "preferredExerciseTypes",
            LegacyField::AvoidedExerciseTypes => "avoidedExerciseTypes",
            LegacyField::PreferredMealTypes => "preferredMealTypes",
            LegacyField::AvoidedMealIngredients => "avoidedMealIngredients",
        }
    }
}

impl std::fmt::Display for LegacyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}
