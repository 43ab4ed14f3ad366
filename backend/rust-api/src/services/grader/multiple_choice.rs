use super::{GradeError, Gradeable, Score};
use crate::models::exercise::{MultipleChoice, MultipleChoiceSubmission};

impl Gradeable for MultipleChoice {
    type Submission = MultipleChoiceSubmission;

    fn grade(&self, submission: &Self::Submission, point_value: u32) -> Result<Score, GradeError> {
        if submission.answers.len() > self.answer_key.len() {
            return Err(GradeError::Invalid(format!(
                "{} answers submitted for {} questions",
                submission.answers.len(),
                self.answer_key.len()
            )));
        }

        let correct = self
            .answer_key
            .iter()
            .zip(&submission.answers)
            .filter(|(expected, given)| {
                given
                    .as_deref()
                    .is_some_and(|given| given.trim() == expected.trim())
            })
            .count() as u32;

        Ok(Score::from_ratio(
            correct,
            self.answer_key.len() as u32,
            point_value,
        ))
    }
}
