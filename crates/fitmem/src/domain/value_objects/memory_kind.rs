//! MemoryKind - Category of a personalization fact

use serde::{Deserialize, Serialize};

use super::LegacyField;

/// Memory kind classification
///
/// The five structured kinds are fixed. Anything else the coach picks up in
/// conversation ("fitnessGoal", "injuryNote", ...) is carried as
/// `Conversational` with its topic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MemoryKind {
    PreferredExercise,
    AvoidedExercise,
    PreferredMeal,
    AvoidedIngredient,
    ActivityPattern,
    Conversational(String),
}

impl MemoryKind {
    /// Conversation-derived kind for a topic
    pub fn conversational(topic: impl Into<String>) -> Self {
        MemoryKind::Conversational(topic.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            MemoryKind::PreferredExercise => "preferredExercise",
            MemoryKind::AvoidedExercise => "avoidedExercise",
            MemoryKind::PreferredMeal => "preferredMeal",
            MemoryKind::AvoidedIngredient => "avoidedIngredient",
            MemoryKind::ActivityPattern => "activityPattern",
            MemoryKind::Conversational(topic) => topic,
        }
    }

    /// Legacy aggregate field this kind is projected into, if any
    pub fn legacy_field(&self) -> Option<LegacyField> {
        match self {
            MemoryKind::PreferredExercise => Some(LegacyField::PreferredExerciseTypes),
            MemoryKind::AvoidedExercise => Some(LegacyField::AvoidedExerciseTypes),
            MemoryKind::PreferredMeal => Some(LegacyField::PreferredMealTypes),
            MemoryKind::AvoidedIngredient => Some(LegacyField::AvoidedMealIngredients),
            MemoryKind::ActivityPattern | MemoryKind::Conversational(_) => None,
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preferredExercise" => Ok(MemoryKind::PreferredExercise),
            "avoidedExercise" => Ok(MemoryKind::AvoidedExercise),
            "preferredMeal" => Ok(MemoryKind::PreferredMeal),
            "avoidedIngredient" => Ok(MemoryKind::AvoidedIngredient),
            "activityPattern" => Ok(MemoryKind::ActivityPattern),
            topic if topic.trim().is_empty() => Err("Memory kind must not be empty".to_string()),
            topic => Ok(MemoryKind::Conversational(topic.to_string())),
        }
    }
}

impl TryFrom<String> for MemoryKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemoryKind> for String {
    fn from(kind: MemoryKind) -> Self {
        match kind {
            MemoryKind::Conversational(topic) => topic,
            other => other.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_kinds_round_trip_through_str() {
        for kind in [
            MemoryKind::PreferredExercise,
            MemoryKind::AvoidedExercise,
            MemoryKind::PreferredMeal,
            MemoryKind::AvoidedIngredient,
            MemoryKind::ActivityPattern,
        ] {
            assert_eq!(kind.as_str().parse::<MemoryKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_conversational() {
        let kind: MemoryKind = "injuryNote".parse().unwrap();
        assert_eq!(kind, MemoryKind::conversational("injuryNote"));
        assert_eq!(kind.legacy_field(), None);
    }

    #[test]
    fn test_empty_kind_is_rejected() {
        assert!("".parse::<MemoryKind>().is_err());
        assert!("  ".parse::<MemoryKind>().is_err());
    }

    #[test]
    fn test_legacy_field_mapping() {
        assert_eq!(
            MemoryKind::PreferredExercise.legacy_field(),
            Some(LegacyField::PreferredExerciseTypes)
        );
        assert_eq!(
            MemoryKind::AvoidedIngredient.legacy_field(),
            Some(LegacyField::AvoidedMealIngredients)
        );
        assert_eq!(MemoryKind::ActivityPattern.legacy_field(), None);
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_value(MemoryKind::PreferredMeal).unwrap();
        assert_eq!(json, serde_json::json!("preferredMeal"));

        let kind: MemoryKind = serde_json::from_value(serde_json::json!("fitnessGoal")).unwrap();
        assert_eq!(kind, MemoryKind::conversational("fitnessGoal"));
    }
}
