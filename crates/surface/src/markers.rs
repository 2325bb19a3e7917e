//! Per-line marker bitmap.

use std::collections::BTreeMap;

/// Sparse map from line number to a 32-bit marker mask.
///
/// Lines without markers are not stored. The table follows its lines
/// through edits: inserted line breaks push markers down, deleted lines
/// fold their markers into the line where the deletion started.
#[derive(Debug, Clone, Default)]
pub struct MarkerTable {
    lines: BTreeMap<usize, u32>,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker mask of `line`.
    pub fn get(&self, line: usize) -> u32 {
        self.lines.get(&line).copied().unwrap_or(0)
    }

    /// Set marker number `marker` (0..32) on `line`.
    pub fn add(&mut self, line: usize, marker: u32) {
        if marker >= u32::BITS {
            return;
        }
        *self.lines.entry(line).or_insert(0) |= 1 << marker;
    }

    /// Clear marker number `marker` on `line`.
    pub fn delete(&mut self, line: usize, marker: u32) {
        if marker >= u32::BITS {
            return;
        }
        if let Some(mask) = self.lines.get_mut(&line) {
            *mask &= !(1 << marker);
            if *mask == 0 {
                self.lines.remove(&line);
            }
        }
    }

    /// Clear marker number `marker` everywhere.
    pub fn delete_all(&mut self, marker: u32) {
        if marker >= u32::BITS {
            return;
        }
        let bit = 1 << marker;
        self.lines.retain(|_, mask| {
            *mask &= !bit;
            *mask != 0
        });
    }

    /// First line at or after `from` whose mask intersects `mask`.
    pub fn next(&self, from: usize, mask: u32) -> Option<usize> {
        self.lines
            .range(from..)
            .find(|(_, bits)| *bits & mask != 0)
            .map(|(line, _)| *line)
    }

    /// Last line at or before `from` whose mask intersects `mask`.
    pub fn previous(&self, from: usize, mask: u32) -> Option<usize> {
        self.lines
            .range(..=from)
            .rev()
            .find(|(_, bits)| *bits & mask != 0)
            .map(|(line, _)| *line)
    }

    /// Lines carrying any of the bits in `mask`, ascending.
    pub fn lines_with(&self, mask: u32) -> Vec<usize> {
        self.lines
            .iter()
            .filter(|(_, bits)| *bits & mask != 0)
            .map(|(line, _)| *line)
            .collect()
    }

    /// `count` line breaks were inserted on `line`.
    pub fn lines_inserted(&mut self, line: usize, count: usize) {
        if count == 0 {
            return;
        }
        let moved = self.lines.split_off(&(line + 1));
        self.lines
            .extend(moved.into_iter().map(|(l, mask)| (l + count, mask)));
    }

    /// `count` line breaks were removed starting on `line`.
    pub fn lines_removed(&mut self, line: usize, count: usize) {
        if count == 0 {
            return;
        }
        let mut tail = self.lines.split_off(&(line + 1));
        let after = tail.split_off(&(line + count + 1));

        let folded = tail.values().fold(0u32, |acc, mask| acc | mask);
        if folded != 0 {
            *self.lines.entry(line).or_insert(0) |= folded;
        }
        self.lines
            .extend(after.into_iter().map(|(l, mask)| (l - count, mask)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_delete() {
        let mut table = MarkerTable::new();
        table.add(3, 0);
        table.add(3, 2);
        assert_eq!(table.get(3), 0b101);

        table.delete(3, 0);
        assert_eq!(table.get(3), 0b100);
        table.delete(3, 2);
        assert_eq!(table.get(3), 0);
        assert!(table.lines_with(u32::MAX).is_empty());
    }

    #[test]
    fn test_next_previous() {
        let mut table = MarkerTable::new();
        table.add(2, 0);
        table.add(5, 1);
        table.add(9, 0);

        assert_eq!(table.next(0, 1), Some(2));
        assert_eq!(table.next(3, 1), Some(9));
        assert_eq!(table.next(3, 0b10), Some(5));
        assert_eq!(table.next(10, 1), None);

        assert_eq!(table.previous(8, 1), Some(2));
        assert_eq!(table.previous(9, 1), Some(9));
        assert_eq!(table.previous(1, 1), None);
    }

    #[test]
    fn test_lines_inserted_shifts_following_markers() {
        let mut table = MarkerTable::new();
        table.add(1, 0);
        table.add(4, 0);

        table.lines_inserted(1, 2);
        assert_eq!(table.lines_with(1), vec![1, 6]);
    }

    #[test]
    fn test_lines_removed_folds_markers() {
        let mut table = MarkerTable::new();
        table.add(2, 0);
        table.add(3, 1);
        table.add(8, 0);

        // Lines 3 and 4 are joined into line 2
        table.lines_removed(2, 2);
        assert_eq!(table.get(2), 0b11);
        assert_eq!(table.get(6), 1);
        assert_eq!(table.get(8), 0);
    }

    #[test]
    fn test_delete_all() {
        let mut table = MarkerTable::new();
        table.add(0, 0);
        table.add(1, 0);
        table.add(1, 1);
        table.delete_all(0);
        assert_eq!(table.lines_with(u32::MAX), vec![1]);
        assert_eq!(table.get(1), 0b10);
    }
}
