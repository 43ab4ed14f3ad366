use super::{GradeError, Gradeable, Score};
use crate::models::exercise::{MatchPairs, MatchPairsSubmission};

impl Gradeable for MatchPairs {
    type Submission = MatchPairsSubmission;

    fn grade(&self, submission: &Self::Submission, point_value: u32) -> Result<Score, GradeError> {
        let correct = self
            .answer_key
            .iter()
            .filter(|(term, definition)| submission.matches.get(*term) == Some(*definition))
            .count() as u32;

        Ok(Score::from_ratio(correct, self.terms.len() as u32, point_value))
    }
}
