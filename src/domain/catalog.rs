//! Counter questionnaire: the pre-check questions shown to shippers,
//! grouped by evaluation phase.
//!
//! Pure reference data for the form-driving layer; the evaluator never
//! consults it.

use serde::{Deserialize, Serialize};

use crate::domain::reference::ReferenceError;
use crate::domain::verdict::Phase;
use crate::util::assets;

/// One counter question with the guidance shown alongside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u8,
    pub phase: Phase,
    pub prompt: String,
    pub guidance: String,
}

/// The embedded question set, loaded once alongside the reference tables.
#[derive(Clone, Debug)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn load() -> Result<Self, ReferenceError> {
        let questions: Vec<Question> = assets::parse_json(assets::QUESTIONS)?;
        Ok(Self { questions })
    }

    pub fn question(&self, id: u8) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn phase_questions(&self, phase: Phase) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.phase == phase)
    }
}
