use super::{GradeError, Gradeable, Score};
use crate::models::exercise::{DiagramPlacement, DiagramPlacementSubmission};

impl Gradeable for DiagramPlacement {
    type Submission = DiagramPlacementSubmission;

    fn grade(&self, submission: &Self::Submission, point_value: u32) -> Result<Score, GradeError> {
        // Every placeholder counts; one with no key entry can never be right.
        let correct = self
            .placeholders
            .iter()
            .filter(|placeholder| {
                match (
                    submission.placements.get(&placeholder.id),
                    self.answer_key.get(&placeholder.id),
                ) {
                    (Some(given), Some(expected)) => labels_match(given, expected),
                    _ => false,
                }
            })
            .count() as u32;

        Ok(Score::from_ratio(
            correct,
            self.placeholders.len() as u32,
            point_value,
        ))
    }
}

fn labels_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exercise::Placeholder;

    fn circuit() -> DiagramPlacement {
        let slots = [
            ("p1", "Battery"),
            ("p2", "Switch"),
            ("p3", "Resistor"),
            ("p4", "LED"),
        ];
        DiagramPlacement {
            placeholders: slots
                .iter()
                .map(|(id, _)| Placeholder {
                    id: id.to_string(),
                    hint: None,
                })
                .collect(),
            labels: slots.iter().map(|(_, l)| l.to_string()).collect(),
            answer_key: slots
                .iter()
                .map(|(id, l)| (id.to_string(), l.to_string()))
                .collect(),
        }
    }

    fn placed(pairs: &[(&str, &str)]) -> DiagramPlacementSubmission {
        DiagramPlacementSubmission {
            placements: pairs
                .iter()
                .map(|(id, l)| (id.to_string(), l.to_string()))
                .collect(),
        }
    }

    #[test]
    fn labels_compare_case_insensitively() {
        let submission = placed(&[
            ("p1", "battery"),
            ("p2", "SWITCH"),
            ("p3", " Resistor "),
            ("p4", "led"),
        ]);

        let score = circuit().grade(&submission, 40).unwrap();

        assert!(score.is_perfect());
    }

    #[test]
    fn swapped_labels_lose_credit() {
        let submission = placed(&[
            ("p1", "Battery"),
            ("p2", "Resistor"),
            ("p3", "Switch"),
            ("p4", "LED"),
        ]);

        let score = circuit().grade(&submission, 40).unwrap();

        assert_eq!(score.correct, 2);
        assert_eq!(score.awarded, 20);
    }

    #[test]
    fn placeholder_without_key_entry_counts_against_the_score() {
        let mut diagram = circuit();
        diagram.answer_key.remove("p4");
        let submission = placed(&[
            ("p1", "Battery"),
            ("p2", "Switch"),
            ("p3", "Resistor"),
            ("p4", "LED"),
        ]);

        let score = diagram.grade(&submission, 40).unwrap();

        assert_eq!(score.correct, 3);
        assert_eq!(score.total, 4);
        assert_eq!(score.awarded, 30);
        assert!(!score.is_perfect());
    }
}
