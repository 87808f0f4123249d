//! Filtered-view cursor logic
//!
//! The question list is browsed through a filtered view (case-insensitive
//! substring match on `model_name`), while the cursor itself is stored as an
//! absolute index into the unfiltered list. These functions translate between
//! the two and keep the cursor valid when the filter or the list changes.

use abrank_common::db::Question;

/// True if the question is visible under the filter.
///
/// An empty filter matches everything.
pub fn matches_filter(question: &Question, filter: &str) -> bool {
    filter.is_empty()
        || question
            .model_name
            .to_lowercase()
            .contains(&filter.to_lowercase())
}

/// Absolute indices of the questions visible under the filter, in original order
pub fn filtered_indices(questions: &[Question], filter: &str) -> Vec<usize> {
    questions
        .iter()
        .enumerate()
        .filter(|(_, q)| matches_filter(q, filter))
        .map(|(i, _)| i)
        .collect()
}

/// Position of the cursor within the filtered view, or None if the
/// cursor's question is excluded by the filter
pub fn filtered_position(questions: &[Question], filter: &str, cursor: usize) -> Option<usize> {
    filtered_indices(questions, filter)
        .iter()
        .position(|&i| i == cursor)
}

/// Re-validate the cursor against the current filter
///
/// If the cursor's question is excluded by the filter, the cursor moves to
/// the first question of the filtered view. If the filtered view is empty,
/// the cursor is left unchanged and downstream rendering shows an empty
/// state.
///
/// # Examples
/// ```
/// use abrank_common::db::Question;
/// use abrank_ui::cursor::reconcile_cursor;
///
/// fn q(id: i64, model: &str) -> Question {
///     Question {
///         id,
///         question: String::new(),
///         answer_a: String::new(),
///         answer_b: String::new(),
///         model_name: model.to_string(),
///     }
/// }
///
/// let questions = vec![q(1, "X"), q(2, "Y"), q(3, "X")];
///
/// // Cursor on question id 2, which filter "x" excludes: moves to id 1
/// assert_eq!(reconcile_cursor(&questions, "x", 1), 0);
///
/// // Cursor already visible: unchanged
/// assert_eq!(reconcile_cursor(&questions, "x", 2), 2);
/// ```
pub fn reconcile_cursor(questions: &[Question], filter: &str, cursor: usize) -> usize {
    if filtered_position(questions, filter, cursor).is_some() {
        return cursor;
    }
    match filtered_indices(questions, filter).first() {
        Some(&first) => first,
        None => cursor,
    }
}

/// Move the cursor by `delta` positions within the filtered view
///
/// The movement is clamped at both ends of the filtered view (no
/// wraparound). The returned value is an absolute index.
pub fn step(questions: &[Question], filter: &str, cursor: usize, delta: i64) -> usize {
    let filtered = filtered_indices(questions, filter);
    if filtered.is_empty() {
        return cursor;
    }

    // A cursor outside the view starts from its reconciled position
    let pos = match filtered.iter().position(|&i| i == cursor) {
        Some(p) => p as i64,
        None => 0,
    };

    let new_pos = (pos + delta).clamp(0, filtered.len() as i64 - 1);
    filtered[new_pos as usize]
}

/// Jump to a 1-based position within the filtered view
///
/// Out-of-range positions are a silent no-op (None), not an error.
pub fn jump(questions: &[Question], filter: &str, one_based: usize) -> Option<usize> {
    let filtered = filtered_indices(questions, filter);
    if one_based < 1 || one_based > filtered.len() {
        return None;
    }
    Some(filtered[one_based - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: i64, model: &str) -> Question {
        Question {
            id,
            question: format!("question {}", id),
            answer_a: "a".to_string(),
            answer_b: "b".to_string(),
            model_name: model.to_string(),
        }
    }

    fn sample() -> Vec<Question> {
        vec![q(1, "X"), q(2, "Y"), q(3, "X")]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let questions = sample();
        assert_eq!(filtered_indices(&questions, ""), vec![0, 1, 2]);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_order_preserving() {
        let questions = sample();
        let filtered = filtered_indices(&questions, "x");
        assert_eq!(filtered, vec![0, 2]);
        assert_eq!(questions[filtered[0]].id, 1);
        assert_eq!(questions[filtered[1]].id, 3);
    }

    #[test]
    fn test_substring_match() {
        let questions = vec![q(1, "gpt-4"), q(2, "gpt-3.5"), q(3, "claude")];
        assert_eq!(filtered_indices(&questions, "GPT"), vec![0, 1]);
        assert_eq!(filtered_indices(&questions, "laud"), vec![2]);
        assert_eq!(filtered_indices(&questions, "llama"), Vec::<usize>::new());
    }

    #[test]
    fn test_reconcile_moves_hidden_cursor_to_first_visible() {
        // Cursor at absolute index 1 (id 2); filter "x" hides it
        let questions = sample();
        assert_eq!(reconcile_cursor(&questions, "x", 1), 0);
        assert_eq!(questions[0].id, 1);
    }

    #[test]
    fn test_reconcile_keeps_visible_cursor() {
        let questions = sample();
        assert_eq!(reconcile_cursor(&questions, "x", 2), 2);
        assert_eq!(reconcile_cursor(&questions, "", 1), 1);
    }

    #[test]
    fn test_reconcile_empty_view_leaves_cursor_unchanged() {
        let questions = sample();
        assert_eq!(reconcile_cursor(&questions, "nomatch", 1), 1);
    }

    #[test]
    fn test_reconciled_cursor_is_always_visible_or_view_empty() {
        let questions = vec![q(1, "X"), q(2, "Y"), q(3, "X"), q(4, "Z"), q(5, "y")];
        for filter in ["", "x", "y", "z", "nomatch"] {
            for cursor in 0..questions.len() {
                let reconciled = reconcile_cursor(&questions, filter, cursor);
                let filtered = filtered_indices(&questions, filter);
                if filtered.is_empty() {
                    assert_eq!(reconciled, cursor);
                } else {
                    assert!(
                        filtered.contains(&reconciled),
                        "cursor {} under filter {:?} reconciled to hidden {}",
                        cursor,
                        filter,
                        reconciled
                    );
                }
            }
        }
    }

    #[test]
    fn test_step_moves_within_filtered_view() {
        let questions = sample();
        // Filter "x": view is [0, 2]; advancing from 0 skips the hidden 1
        assert_eq!(step(&questions, "x", 0, 1), 2);
        assert_eq!(step(&questions, "x", 2, -1), 0);
    }

    #[test]
    fn test_step_clamps_at_bounds() {
        let questions = sample();
        assert_eq!(step(&questions, "", 0, -1), 0);
        assert_eq!(step(&questions, "", 2, 1), 2);
        assert_eq!(step(&questions, "x", 2, 1), 2);
    }

    #[test]
    fn test_step_on_empty_view_is_noop() {
        let questions = sample();
        assert_eq!(step(&questions, "nomatch", 1, 1), 1);
    }

    #[test]
    fn test_jump_translates_filtered_position_to_absolute() {
        let questions = sample();
        assert_eq!(jump(&questions, "x", 1), Some(0));
        assert_eq!(jump(&questions, "x", 2), Some(2));
        assert_eq!(jump(&questions, "", 2), Some(1));
    }

    #[test]
    fn test_jump_out_of_range_is_silent_noop() {
        let questions = sample();
        assert_eq!(jump(&questions, "x", 0), None);
        assert_eq!(jump(&questions, "x", 3), None);
        assert_eq!(jump(&questions, "nomatch", 1), None);
    }
}
