/// Action for undo/redo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Text insertion at a character offset
    Insert { position: usize, text: String },
    /// Text deletion at a character offset
    Delete { position: usize, text: String },
    /// Actions undone and redone as one step
    Group { actions: Vec<Action> },
}

impl Action {
    /// Get inverse action
    pub fn inverse(&self) -> Action {
        match self {
            Action::Insert { position, text } => Action::Delete {
                position: *position,
                text: text.clone(),
            },
            Action::Delete { position, text } => Action::Insert {
                position: *position,
                text: text.clone(),
            },
            Action::Group { actions } => Action::Group {
                actions: actions.iter().rev().map(|a| a.inverse()).collect(),
            },
        }
    }

    /// Check if can merge with another action
    pub fn can_merge_with(&self, other: &Action) -> bool {
        match (self, other) {
            // Merge consecutive typed characters
            (
                Action::Insert {
                    position: pos1,
                    text: text1,
                },
                Action::Insert {
                    position: pos2,
                    text: text2,
                },
            ) => {
                text2.chars().count() == 1
                    && !text2.contains('\n')
                    && !text1.contains('\n')
                    && *pos2 == pos1 + text1.chars().count()
            }
            // Merge consecutive backspaces
            (
                Action::Delete {
                    position: pos1,
                    text: text1,
                },
                Action::Delete {
                    position: pos2,
                    text: text2,
                },
            ) => {
                text2.chars().count() == 1
                    && !text2.contains('\n')
                    && !text1.contains('\n')
                    && pos2 + 1 == *pos1
            }
            _ => false,
        }
    }

    /// Merge with another action
    pub fn merge(&mut self, other: Action) {
        match (self, other) {
            (Action::Insert { text: text1, .. }, Action::Insert { text: text2, .. }) => {
                text1.push_str(&text2);
            }
            (
                Action::Delete {
                    position,
                    text: text1,
                },
                Action::Delete {
                    position: pos2,
                    text: text2,
                },
            ) => {
                // Backspace - add character to beginning
                *position = pos2;
                text1.insert_str(0, &text2);
            }
            _ => {}
        }
    }
}

/// Edit history for undo/redo
#[derive(Debug, Clone)]
pub struct History {
    /// Action stack for undo
    undo_stack: Vec<Action>,
    /// Action stack for redo
    redo_stack: Vec<Action>,
    /// Maximum history size
    max_size: usize,
    /// Current accumulated action
    pending_action: Option<Action>,
    /// Nesting depth of open undo groups
    group_depth: usize,
    /// Actions collected by the open group
    group: Vec<Action>,
}

impl History {
    /// Create a new history
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create history with specified size
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
            pending_action: None,
            group_depth: 0,
            group: Vec::new(),
        }
    }

    /// Record action to history
    pub fn push(&mut self, action: Action) {
        // Clear redo stack on new action
        self.redo_stack.clear();

        if self.group_depth > 0 {
            self.group.push(action);
            return;
        }

        // Try to merge with previous action
        if let Some(pending) = &mut self.pending_action {
            if pending.can_merge_with(&action) {
                pending.merge(action);
                return;
            }
        }

        // Cannot merge - save accumulated action and start a new one
        self.commit_pending();
        self.pending_action = Some(action);
    }

    /// Open an undo group. Nested calls only bump the depth.
    pub fn begin_group(&mut self) {
        if self.group_depth == 0 {
            self.commit_pending();
        }
        self.group_depth += 1;
    }

    /// Close an undo group. The outermost close stores the collected actions
    /// as a single step.
    pub fn end_group(&mut self) {
        if self.group_depth == 0 {
            return;
        }
        self.group_depth -= 1;
        if self.group_depth > 0 {
            return;
        }

        let actions = std::mem::take(&mut self.group);
        match actions.len() {
            0 => {}
            1 => self.push_completed(actions.into_iter().next()),
            _ => self.push_completed(Some(Action::Group { actions })),
        }
    }

    /// Check whether an undo group is open
    pub fn in_group(&self) -> bool {
        self.group_depth > 0
    }

    /// Complete current action group (e.g., on focus loss)
    pub fn commit_pending(&mut self) {
        let action = self.pending_action.take();
        self.push_completed(action);
    }

    fn push_completed(&mut self, action: Option<Action>) {
        let Some(action) = action else {
            return;
        };
        self.undo_stack.push(action);

        // Limit history size
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Undo last action
    pub fn undo(&mut self) -> Option<Action> {
        // First complete current action
        self.commit_pending();

        let action = self.undo_stack.pop()?;
        let inverse = action.inverse();
        self.redo_stack.push(action);
        Some(inverse)
    }

    /// Redo undone action
    pub fn redo(&mut self) -> Option<Action> {
        self.commit_pending();

        // Return original action (not inverse!)
        let action = self.redo_stack.pop()?;
        self.undo_stack.push(action.clone());
        Some(action)
    }

    /// Check if undo is possible
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.pending_action.is_some()
    }

    /// Check if redo is possible
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending_action = None;
        self.group.clear();
        self.group_depth = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(position: usize, text: &str) -> Action {
        Action::Insert {
            position,
            text: text.to_string(),
        }
    }

    fn delete(position: usize, text: &str) -> Action {
        Action::Delete {
            position,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_simple_undo_redo() {
        let mut history = History::new();

        history.push(insert(0, "hello"));
        history.commit_pending();

        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo(), Some(delete(0, "hello")));
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert_eq!(history.redo(), Some(insert(0, "hello")));
    }

    #[test]
    fn test_merge_inserts() {
        let mut history = History::new();

        history.push(insert(0, "h"));
        history.push(insert(1, "e"));
        history.push(insert(2, "l"));
        history.commit_pending();

        assert_eq!(history.undo_stack.len(), 1);
        assert_eq!(history.undo(), Some(delete(0, "hel")));
    }

    #[test]
    fn test_merge_deletes() {
        let mut history = History::new();

        // Consecutive backspace
        history.push(delete(3, "l"));
        history.push(delete(2, "l"));
        history.push(delete(1, "e"));
        history.commit_pending();

        assert_eq!(history.undo(), Some(insert(1, "ell")));
    }

    #[test]
    fn test_newline_breaks_merge() {
        let mut history = History::new();

        history.push(insert(0, "h"));
        history.push(insert(1, "\n"));
        history.commit_pending();

        assert_eq!(history.undo_stack.len(), 2);
    }

    #[test]
    fn test_group_is_single_step() {
        let mut history = History::new();

        history.begin_group();
        history.push(delete(0, "ipsum"));
        history.push(insert(0, "lorem"));
        history.begin_group();
        history.push(delete(10, "ipsum"));
        history.end_group();
        assert!(history.in_group());
        history.end_group();

        assert!(!history.in_group());
        assert_eq!(history.undo_stack.len(), 1);

        match history.undo() {
            Some(Action::Group { actions }) => {
                assert_eq!(actions.len(), 3);
                assert_eq!(actions[0], insert(10, "ipsum"));
                assert_eq!(actions[2], insert(0, "ipsum"));
            }
            other => panic!("Expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_group_records_nothing() {
        let mut history = History::new();
        history.begin_group();
        history.end_group();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_capacity_limit() {
        let mut history = History::with_capacity(2);
        history.push(insert(0, "a\n"));
        history.push(insert(2, "b\n"));
        history.push(insert(4, "c\n"));
        history.commit_pending();

        assert_eq!(history.undo_stack.len(), 2);
        assert_eq!(history.undo(), Some(delete(4, "c\n")));
        assert_eq!(history.undo(), Some(delete(2, "b\n")));
        assert_eq!(history.undo(), None);
    }
}
