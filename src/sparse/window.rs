//! Staging buffers of the windowed substitution.
//!
//! One window is `block_dim` consecutive positions of the nonzero arrays. Lane `k`
//! stages position `window_start + k`; lanes past `nnz` stage neutral values that the
//! coordinator skips, so no lane ever reads past the arrays.
use crate::backend::launch::ThreadBlock;
use crate::backend::scalar::Real;
use crate::sparse::frontier::Direction;

/// row index of a lane that holds no entry; keeps staged rows sorted
pub const NO_ROW: usize = usize::MAX;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StagedEntry<T> {
    pub column: usize,
    pub element: T,
    /// `x[column]` as it was when the window was loaded
    pub x: T,
}

/// Window of the row-oriented substitution: (column, coefficient, x[column]) per lane.
pub struct EntryWindow<T> {
    slots: Vec<StagedEntry<T>>,
}

impl<T: Real> EntryWindow<T> {
    pub fn new(block_dim: usize) -> Self {
        EntryWindow {
            slots: vec![StagedEntry::default(); block_dim],
        }
    }

    /// Lane phase: stage positions `window_start..window_start + block_dim`.
    pub fn load(
        &mut self,
        block: &ThreadBlock,
        column_indices: &[usize],
        elements: &[T],
        vector: &[T],
        window_start: usize,
        nnz: usize,
    ) {
        block.lanes(&mut self.slots, |lane, slot| {
            let entry = window_start + lane;
            *slot = if entry < nnz {
                let column = column_indices[entry];
                StagedEntry {
                    column,
                    element: elements[entry],
                    x: vector[column],
                }
            } else {
                StagedEntry::default()
            };
        });
    }

    pub fn get(&self, lane: usize) -> &StagedEntry<T> {
        &self.slots[lane]
    }
}

/// Lookahead slice of `row_offsets` staged next to a transposed window.
/// Slot `k` holds `row_offsets[first_row + k]`, or `NO_ROW` past the valid range.
pub struct RowLookahead {
    first_row: usize,
    table: Vec<usize>,
}

impl RowLookahead {
    pub fn new(block_dim: usize) -> Self {
        RowLookahead {
            first_row: 0,
            table: vec![NO_ROW; block_dim],
        }
    }

    /// Lane phase: stage `row_offsets[first_row..=last_row]`, sentinels beyond.
    pub fn load(&mut self, block: &ThreadBlock, row_offsets: &[usize], first_row: usize, last_row: usize) {
        self.first_row = first_row;
        block.lanes(&mut self.table, |lane, slot| {
            let row = first_row + lane;
            *slot = if row <= last_row { row_offsets[row] } else { NO_ROW };
        });
    }

    #[cfg(test)]
    fn first_row(&self) -> usize {
        self.first_row
    }

    /// Storage row owning nonzero position `entry`: the largest `r` with
    /// `row_offsets[r] <= entry`. `None` when the answer lies outside the table.
    pub fn owning_row(&self, entry: usize, direction: Direction) -> Option<usize> {
        let table = &self.table;
        match direction {
            Direction::Forward => {
                if table[0] > entry {
                    return None;
                }
                let mut inc = 0;
                while inc + 1 < table.len() && table[inc + 1] <= entry {
                    inc += 1;
                }
                // ran off the table without an upper bound
                if inc + 1 == table.len() {
                    return None;
                }
                Some(self.first_row + inc)
            }
            Direction::Backward => {
                let mut inc = table.len() - 1;
                while inc > 0 && table[inc] > entry {
                    inc -= 1;
                }
                if table[inc] > entry {
                    return None;
                }
                Some(self.first_row + inc)
            }
        }
    }
}

/// Binary search fallback for lanes whose row lies beyond the lookahead table,
/// which happens when one window spans more empty rows than the block has lanes.
pub fn search_owning_row(row_offsets: &[usize], entry: usize, size: usize) -> usize {
    let row = row_offsets.partition_point(|&offset| offset <= entry).saturating_sub(1);
    row.min(size.saturating_sub(1))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterSlot<T> {
    pub column: usize,
    pub element: T,
    /// owning storage row, `NO_ROW` for lanes past `nnz`
    pub row: usize,
    /// staged scatter term `element * x[row]`
    pub delta: T,
}

impl<T: Real> Default for ScatterSlot<T> {
    fn default() -> Self {
        ScatterSlot {
            column: 0,
            element: T::zero(),
            row: NO_ROW,
            delta: T::zero(),
        }
    }
}

/// Window of the transposed substitution.
pub struct ScatterWindow<T> {
    slots: Vec<ScatterSlot<T>>,
    valid: usize,
}

impl<T: Real> ScatterWindow<T> {
    pub fn new(block_dim: usize) -> Self {
        ScatterWindow {
            slots: vec![ScatterSlot::default(); block_dim],
            valid: 0,
        }
    }

    /// Load round: every lane stages its (column, coefficient).
    pub fn load(
        &mut self,
        block: &ThreadBlock,
        column_indices: &[usize],
        elements: &[T],
        window_start: usize,
        nnz: usize,
    ) {
        self.valid = nnz.saturating_sub(window_start).min(self.slots.len());
        block.lanes(&mut self.slots, |lane, slot| {
            let entry = window_start + lane;
            *slot = if entry < nnz {
                ScatterSlot {
                    column: column_indices[entry],
                    element: elements[entry],
                    row: NO_ROW,
                    delta: T::zero(),
                }
            } else {
                ScatterSlot::default()
            };
        });
    }

    /// Row-recovery round: each lane finds the storage row of its entry.
    pub fn recover_rows(
        &mut self,
        block: &ThreadBlock,
        lookahead: &RowLookahead,
        row_offsets: &[usize],
        window_start: usize,
        size: usize,
        direction: Direction,
    ) {
        let valid = self.valid;
        block.lanes(&mut self.slots[..valid], |lane, slot| {
            let entry = window_start + lane;
            slot.row = lookahead
                .owning_row(entry, direction)
                .unwrap_or_else(|| search_owning_row(row_offsets, entry, size));
        });
    }

    /// Number of lanes holding an entry.
    pub fn valid(&self) -> usize {
        self.valid
    }

    /// Rows of the first and last staged entries. Staged rows are non-decreasing in lane order.
    pub fn row_span(&self) -> Option<(usize, usize)> {
        if self.valid == 0 {
            return None;
        }
        Some((self.slots[0].row, self.slots[self.valid - 1].row))
    }

    /// Lanes holding the entries of storage row `row`.
    pub fn band(&self, row: usize) -> std::ops::Range<usize> {
        let staged = &self.slots[..self.valid];
        let lo = staged.partition_point(|s| s.row < row);
        let hi = staged.partition_point(|s| s.row <= row);
        lo..hi
    }

    /// Lane phase over one row band: the lanes of `band` compute their scatter terms.
    /// Only entries on the scatter side of the diagonal get a nonzero term.
    pub fn stage_deltas(
        &mut self,
        block: &ThreadBlock,
        band: std::ops::Range<usize>,
        x_row: T,
        direction: Direction,
    ) {
        block.lanes(&mut self.slots[band], |_, slot| {
            slot.delta = if scatters(slot, direction) {
                slot.element * x_row
            } else {
                T::zero()
            };
        });
    }

    /// Coordinator: commit the staged terms of `band` into the solution vector.
    pub fn commit(&self, band: std::ops::Range<usize>, vector: &mut [T], direction: Direction) {
        for slot in &self.slots[band] {
            if scatters(slot, direction) {
                vector[slot.column] = vector[slot.column] - slot.delta;
            }
        }
    }
}

fn scatters<T>(slot: &ScatterSlot<T>, direction: Direction) -> bool {
    match direction {
        Direction::Forward => slot.column > slot.row,
        Direction::Backward => slot.column < slot.row,
    }
}
