use std::collections::BTreeSet;

use super::{GradeError, Gradeable, Score};
use crate::models::exercise::{GridCell, WordSearch, WordSearchSubmission};

impl Gradeable for WordSearch {
    type Submission = WordSearchSubmission;

    fn grade(&self, submission: &Self::Submission, point_value: u32) -> Result<Score, GradeError> {
        let grid = letter_grid(&self.grid)?;
        let words: Vec<Vec<char>> = self.words.iter().map(|w| normalize(w)).collect();

        let mut found = BTreeSet::new();
        for selection in &submission.selections {
            if let Some(cell) = selection.iter().find(|c| letter_at(&grid, **c).is_none()) {
                return Err(GradeError::Invalid(format!(
                    "cell ({}, {}) is outside the grid",
                    cell.row, cell.col
                )));
            }
            let Some(letters) = read_line(&grid, selection) else {
                continue;
            };
            if let Some(index) = find_word(&words, &letters, &found) {
                found.insert(index);
            }
        }

        Ok(Score::from_ratio(
            found.len() as u32,
            self.words.len() as u32,
            point_value,
        ))
    }
}

/// Letters under a selection, provided it is a straight run of at least two
/// adjacent cells in one of the eight directions.
pub fn read_line(grid: &[Vec<char>], cells: &[GridCell]) -> Option<Vec<char>> {
    if cells.len() < 2 {
        return None;
    }

    let dr = cells[1].row - cells[0].row;
    let dc = cells[1].col - cells[0].col;
    if dr.abs() > 1 || dc.abs() > 1 || (dr == 0 && dc == 0) {
        return None;
    }

    let straight = cells
        .windows(2)
        .all(|pair| pair[1].row - pair[0].row == dr && pair[1].col - pair[0].col == dc);
    if !straight {
        return None;
    }

    cells.iter().map(|cell| letter_at(grid, *cell)).collect()
}

/// Index of a word not yet in `found` that the letters spell. A forward
/// reading wins over a backward one, so reverse pairs such as DOG and GOD
/// are each credited by their own selection.
pub fn find_word(
    words: &[Vec<char>],
    letters: &[char],
    found: &BTreeSet<usize>,
) -> Option<usize> {
    let unfound = |index: &usize| !found.contains(index);
    let forward = (0..words.len())
        .filter(unfound)
        .find(|&index| words[index].iter().eq(letters.iter()));
    forward.or_else(|| {
        (0..words.len())
            .filter(unfound)
            .find(|&index| words[index].iter().eq(letters.iter().rev()))
    })
}

fn letter_grid(rows: &[String]) -> Result<Vec<Vec<char>>, GradeError> {
    let grid: Vec<Vec<char>> = rows.iter().map(|row| normalize(row)).collect();
    if let Some(width) = grid.first().map(Vec::len) {
        if grid.iter().any(|row| row.len() != width) {
            return Err(GradeError::Invalid(
                "word search grid rows differ in length".to_string(),
            ));
        }
    }
    Ok(grid)
}

fn letter_at(grid: &[Vec<char>], cell: GridCell) -> Option<char> {
    let row = usize::try_from(cell.row).ok()?;
    let col = usize::try_from(cell.col).ok()?;
    grid.get(row)?.get(col).copied()
}

fn normalize(text: &str) -> Vec<char> {
    text.trim().chars().flat_map(char::to_uppercase).collect()
}
