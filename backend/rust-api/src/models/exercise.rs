use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exercise definition as stored in the course catalog. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "_id")]
    pub id: i64,
    pub lesson_id: i64,
    pub prompt: String,
    pub point_value: u32,
    pub content: ExerciseContent,
}

impl Exercise {
    pub fn kind(&self) -> ExerciseKind {
        self.content.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    MatchPairs,
    WordSearch,
    MultipleChoice,
    DiagramPlacement,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::MatchPairs => "match_pairs",
            ExerciseKind::WordSearch => "word_search",
            ExerciseKind::MultipleChoice => "multiple_choice",
            ExerciseKind::DiagramPlacement => "diagram_placement",
        }
    }
}

/// Kind-specific question data and answer key, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseContent {
    MatchPairs(MatchPairs),
    WordSearch(WordSearch),
    MultipleChoice(MultipleChoice),
    DiagramPlacement(DiagramPlacement),
}

impl ExerciseContent {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            ExerciseContent::MatchPairs(_) => ExerciseKind::MatchPairs,
            ExerciseContent::WordSearch(_) => ExerciseKind::WordSearch,
            ExerciseContent::MultipleChoice(_) => ExerciseKind::MultipleChoice,
            ExerciseContent::DiagramPlacement(_) => ExerciseKind::DiagramPlacement,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPairs {
    pub terms: Vec<String>,
    pub definitions: Vec<String>,
    /// term -> definition
    pub answer_key: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordSearch {
    /// One string per grid row; every row has the same number of letters.
    pub grid: Vec<String>,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub questions: Vec<ChoiceQuestion>,
    /// Correct option text, one per question.
    pub answer_key: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramPlacement {
    pub placeholders: Vec<Placeholder>,
    pub labels: Vec<String>,
    /// placeholder id -> expected label
    pub answer_key: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placeholder {
    pub id: String,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchPairsSubmission {
    pub matches: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridCell {
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordSearchSubmission {
    pub selections: Vec<Vec<GridCell>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultipleChoiceSubmission {
    /// `None` marks an unanswered question.
    pub answers: Vec<Option<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagramPlacementSubmission {
    pub placements: BTreeMap<String, String>,
}
