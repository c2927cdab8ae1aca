//! MemorySource - How a memory was observed

use serde::{Deserialize, Serialize};

/// Observation channel that produced a memory
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MemorySource {
    CompletedExercise,
    SkippedExercise,
    CompletedMeal,
    SkippedMeal,
    Conversation,
    HealthKitPattern,
}

impl MemorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemorySource::CompletedExercise => "completedExercise",
            MemorySource::SkippedExercise => "skippedExercise",
            MemorySource::CompletedMeal => "completedMeal",
            MemorySource::SkippedMeal => "skippedMeal",
            MemorySource::Conversation => "conversation",
            MemorySource::HealthKitPattern => "healthKitPattern",
        }
    }
}

impl std::fmt::Display for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemorySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completedExercise" => Ok(MemorySource::CompletedExercise),
            "skippedExercise" => Ok(MemorySource::SkippedExercise),
            "completedMeal" => Ok(MemorySource::CompletedMeal),
            "skippedMeal" => Ok(MemorySource::SkippedMeal),
            "conversation" => Ok(MemorySource::Conversation),
            "healthKitPattern" => Ok(MemorySource::HealthKitPattern),
            _ => Err(format!("Unknown memory source: {}", s)),
        }
    }
}
