use tracing::debug;

use crate::error::Result;
use crate::timeline::types::EditDecisionList;
use crate::timeline::validator::TimelineValidator;

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Holder of the current edit decision list, with undo and redo.
///
/// This is the only place a list becomes "current", and nothing gets there
/// without passing validation.
#[derive(Debug, Clone)]
pub struct EditHistory {
    current: EditDecisionList,
    undo_stack: Vec<EditDecisionList>,
    redo_stack: Vec<EditDecisionList>,
    limit: usize,
}

impl EditHistory {
    /// Start a history from a generated list
    pub fn new(edl: EditDecisionList) -> Result<Self> {
        Self::with_limit(edl, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(edl: EditDecisionList, limit: usize) -> Result<Self> {
        TimelineValidator::validate(&edl)?;
        Ok(Self {
            current: edl,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        })
    }

    pub fn current(&self) -> &EditDecisionList {
        &self.current
    }

    /// Replace the current list; the redo stack is dropped
    pub fn commit(&mut self, edl: EditDecisionList) -> Result<()> {
        TimelineValidator::validate(&edl)?;

        let previous = std::mem::replace(&mut self.current, edl);
        self.undo_stack.push(previous);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();

        debug!("Committed edit ({} undo steps)", self.undo_stack.len());
        Ok(())
    }

    /// Run an edit operation against the current list and commit its result
    ///
    /// ```rust,no_run
    /// # use beatcut::timeline::{EditDecisionList, EditHistory};
    /// # fn demo(edl: EditDecisionList) -> beatcut::Result<()> {
    /// let mut history = EditHistory::new(edl)?;
    /// history.apply(|edl| edl.trim_out("clip-002", 3.5))?;
    /// history.undo();
    /// # Ok(())
    /// # }
    /// ```
    pub fn apply<F>(&mut self, edit: F) -> Result<&EditDecisionList>
    where
        F: FnOnce(&EditDecisionList) -> Result<EditDecisionList>,
    {
        let next = edit(&self.current)?;
        self.commit(next)?;
        Ok(&self.current)
    }

    /// Step back one edit; returns false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let undone = std::mem::replace(&mut self.current, previous);
                self.redo_stack.push(undone);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone edit; returns false when there is none
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let replaced = std::mem::replace(&mut self.current, next);
                self.undo_stack.push(replaced);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::fixtures::{three_clip_edl, three_clip_parts};
    use crate::timeline::types::TransitionSpec;

    #[test]
    fn test_undo_redo() {
        let mut history = EditHistory::new(three_clip_edl()).unwrap();
        assert!(!history.can_undo());

        history.apply(|edl| edl.trim_out("clip-003", 5.0)).unwrap();
        assert_eq!(history.current().total_duration(), 5.0);

        assert!(history.undo());
        assert_eq!(history.current().total_duration(), 6.0);
        assert!(history.can_redo());

        assert!(history.redo());
        assert_eq!(history.current().total_duration(), 5.0);
        assert!(!history.redo());
    }

    #[test]
    fn test_failed_edit_leaves_current_untouched() {
        let mut history = EditHistory::new(three_clip_edl()).unwrap();
        let before = history.current().clone();

        let result = history.apply(|edl| edl.retransition("tr-001", TransitionSpec::dissolve(5.0)));
        assert!(result.is_err());
        assert_eq!(history.current(), &before);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_invalid_list_never_committed() {
        let mut parts = three_clip_parts();
        parts.total_duration = 60.0;
        let broken = EditDecisionList::from_parts(parts);

        assert!(EditHistory::new(broken.clone()).is_err());

        let mut history = EditHistory::new(three_clip_edl()).unwrap();
        assert!(history.commit(broken).is_err());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_commit_clears_redo_and_respects_limit() {
        let mut history = EditHistory::with_limit(three_clip_edl(), 2).unwrap();
        for out in [5.5, 5.0, 4.5] {
            history.apply(|edl| edl.trim_out("clip-003", out)).unwrap();
        }
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.current().total_duration(), 5.5);

        history.apply(|edl| edl.trim_out("clip-002", 3.5)).unwrap();
        assert!(!history.can_redo());
    }
}
