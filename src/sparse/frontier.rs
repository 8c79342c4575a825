//! Solved frontier of a triangular substitution.
//!
//! Rows are finalised strictly in solve order (increasing for forward, decreasing
//! for backward). Everything behind the frontier is final and is only ever read;
//! everything ahead of it is still accumulating. The state lives for one kernel call.
use crate::backend::scalar::Real;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Direction {
    Forward,
    Backward,
}

/// Frontier of the row-oriented (non-transposed) substitution, owned by the coordinator.
///
/// `accumulator` holds `b[current_row]` minus the contributions seen so far; finalizing
/// writes it back (divided by the diagonal for non-unit solves) and moves to the next row.
#[derive(Debug, Clone)]
pub struct RowCursor<T> {
    direction: Direction,
    size: usize,
    current_row: usize,
    row_at_window_start: usize,
    accumulator: T,
    finished: bool,
}

impl<T: Real> RowCursor<T> {
    /// Cursor on the first row in solve order. `size` must be positive.
    pub fn new(direction: Direction, vector: &[T], size: usize) -> Self {
        let current_row = match direction {
            Direction::Forward => 0,
            Direction::Backward => size - 1,
        };
        RowCursor {
            direction,
            size,
            current_row,
            row_at_window_start: current_row,
            accumulator: vector[current_row],
            finished: false,
        }
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    pub fn row_at_window_start(&self) -> usize {
        self.row_at_window_start
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Bookmark the frontier at the moment a window is staged.
    pub fn mark_window(&mut self) {
        self.row_at_window_start = self.current_row;
    }

    /// True if `column` was already final when the current window was staged,
    /// so the staged copy of `x[column]` is valid.
    pub fn staged_is_final(&self, column: usize) -> bool {
        match self.direction {
            Direction::Forward => column < self.row_at_window_start,
            Direction::Backward => column > self.row_at_window_start,
        }
    }

    /// True if `column` lies strictly behind the current row in solve order,
    /// i.e. the entry is an off-diagonal contribution to the current row.
    pub fn contributes(&self, column: usize) -> bool {
        match self.direction {
            Direction::Forward => column < self.current_row,
            Direction::Backward => column > self.current_row,
        }
    }

    pub fn subtract(&mut self, term: T) {
        self.accumulator = self.accumulator - term;
    }

    /// Commit the current row and advance to the next one in solve order.
    pub fn finalize(&mut self, vector: &mut [T], diagonal: Option<&[T]>) {
        let row = self.current_row;
        vector[row] = match diagonal {
            Some(d) => self.accumulator / d[row],
            None => self.accumulator,
        };
        match self.direction {
            Direction::Forward if row + 1 < self.size => self.current_row = row + 1,
            Direction::Backward if row > 0 => self.current_row = row - 1,
            _ => {
                self.finished = true;
                return;
            }
        }
        self.accumulator = vector[self.current_row];
    }
}

/// Frontier of the transposed substitution: rows settled so far.
///
/// Settling a row makes `x[row]` final (the non-unit variants divide by the diagonal at
/// that moment). A row is settled at most once, even when its entries straddle windows.
#[derive(Debug, Clone)]
pub struct SettledRows {
    direction: Direction,
    size: usize,
    /// forward: rows `< boundary` are settled; backward: rows `>= boundary` are settled
    boundary: usize,
}

impl SettledRows {
    pub fn new(direction: Direction, size: usize) -> Self {
        let boundary = match direction {
            Direction::Forward => 0,
            Direction::Backward => size,
        };
        SettledRows {
            direction,
            size,
            boundary,
        }
    }

    #[cfg(test)]
    fn is_settled(&self, row: usize) -> bool {
        match self.direction {
            Direction::Forward => row < self.boundary,
            Direction::Backward => row >= self.boundary,
        }
    }

    /// Settle every unsettled row from the frontier up to and including `row`.
    pub fn settle_through<T: Real>(&mut self, row: usize, vector: &mut [T], diagonal: Option<&[T]>) {
        match self.direction {
            Direction::Forward => {
                let last = row.min(self.size.saturating_sub(1));
                while self.boundary <= last && self.boundary < self.size {
                    settle(self.boundary, vector, diagonal);
                    self.boundary += 1;
                }
            }
            Direction::Backward => {
                while self.boundary > row {
                    self.boundary -= 1;
                    settle(self.boundary, vector, diagonal);
                }
            }
        }
    }

    /// Settle everything left, including trailing rows without entries.
    pub fn settle_all<T: Real>(&mut self, vector: &mut [T], diagonal: Option<&[T]>) {
        if self.size == 0 {
            return;
        }
        let last = match self.direction {
            Direction::Forward => self.size - 1,
            Direction::Backward => 0,
        };
        self.settle_through(last, vector, diagonal);
    }
}

fn settle<T: Real>(row: usize, vector: &mut [T], diagonal: Option<&[T]>) {
    if let Some(d) = diagonal {
        vector[row] = vector[row] / d[row];
    }
}
