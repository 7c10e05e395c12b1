//! Board structure with checked placement and LIFO undo

use super::bitboard::Bitboard;
use super::{Pos, Side, BOARD_SIZE, TOTAL_CELLS};
use crate::error::EngineError;
use crate::rules;

/// Game board.
///
/// The search mutates one board in place (`place` / `undo`) instead of
/// copying it per node, so every `place` must be matched by an `undo` of the
/// same cell in reverse order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
}

/// Exact occupancy of a board plus the side a score is taken for, used as
/// the transposition cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey {
    black: Bitboard,
    white: Bitboard,
    perspective: Side,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
        }
    }

    /// Get the stone at position, `None` when empty
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Side> {
        if self.black.get(pos) {
            Some(Side::Black)
        } else if self.white.get(pos) {
            Some(Side::White)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.occupied().get(pos)
    }

    /// Cells holding a stone of either side
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.black | self.white
    }

    /// Place a stone for `side`.
    ///
    /// Rejects out-of-range coordinates and occupied cells before touching
    /// the board.
    pub fn place(&mut self, pos: Pos, side: Side) -> Result<(), EngineError> {
        if !Pos::is_valid(i32::from(pos.row), i32::from(pos.col)) {
            return Err(EngineError::OutOfBounds {
                row: i32::from(pos.row),
                col: i32::from(pos.col),
            });
        }
        if !self.is_empty(pos) {
            return Err(EngineError::Occupied {
                row: i32::from(pos.row),
                col: i32::from(pos.col),
            });
        }
        self.place_unchecked(pos, side);
        Ok(())
    }

    /// Place without validation. Search only calls this on cells taken
    /// from the candidate set, which are empty by construction.
    #[inline]
    pub(crate) fn place_unchecked(&mut self, pos: Pos, side: Side) {
        debug_assert!(self.is_empty(pos), "place on occupied cell {pos}");
        self.stones_mut(side).set(pos);
    }

    /// Reset a cell to empty. Must undo the most recent `place`.
    #[inline]
    pub fn undo(&mut self, pos: Pos) {
        debug_assert!(!self.is_empty(pos), "undo on empty cell {pos}");
        self.black.clear(pos);
        self.white.clear(pos);
    }

    /// Get bitboard for a side
    #[inline]
    pub fn stones(&self, side: Side) -> &Bitboard {
        match side {
            Side::Black => &self.black,
            Side::White => &self.white,
        }
    }

    #[inline]
    fn stones_mut(&mut self, side: Side) -> &mut Bitboard {
        match side {
            Side::Black => &mut self.black,
            Side::White => &mut self.white,
        }
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    #[inline]
    pub fn empty_count(&self) -> usize {
        TOTAL_CELLS - self.stone_count() as usize
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.occupied().is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// True if `side` has a run of five or more along any axis.
    pub fn has_five_in_row(&self, side: Side) -> bool {
        rules::has_five_in_row(self, side)
    }

    /// Cache key of the full grid as scored for `perspective`
    #[inline]
    pub fn key(&self, perspective: Side) -> BoardKey {
        BoardKey {
            black: self.black,
            white: self.white,
            perspective,
        }
    }

    /// Encode the grid row-major as +1 (own), -1 (opponent), 0 (empty).
    pub fn flatten(&self, perspective: Side) -> Vec<f64> {
        let mut out = vec![0.0; TOTAL_CELLS];
        for pos in self.stones(perspective).iter_ones() {
            out[pos.to_index()] = 1.0;
        }
        for pos in self.stones(perspective.opponent()).iter_ones() {
            out[pos.to_index()] = -1.0;
        }
        out
    }

    /// Same occupancy with the two sides exchanged
    pub fn swapped(&self) -> Board {
        Board {
            black: self.white,
            white: self.black,
        }
    }
}

impl std::str::FromStr for Board {
    type Err = EngineError;

    /// Parse 15 rows of `.`, `X` (black) and `O` (white). Whitespace inside a
    /// row is ignored, blank lines are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != BOARD_SIZE {
            return Err(EngineError::InvalidBoard(format!(
                "expected {BOARD_SIZE} rows, found {}",
                rows.len()
            )));
        }

        let mut board = Board::new();
        for (r, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != BOARD_SIZE {
                return Err(EngineError::InvalidBoard(format!(
                    "row {r} has {} cells, expected {BOARD_SIZE}",
                    cells.len()
                )));
            }
            for (c, ch) in cells.into_iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let pos = Pos::new(r as u8, c as u8);
                match ch {
                    '.' | '+' => {}
                    'X' | 'x' => board.place(pos, Side::Black)?,
                    'O' | 'o' => board.place(pos, Side::White)?,
                    other => {
                        return Err(EngineError::InvalidBoard(format!(
                            "unexpected '{other}' at {pos}"
                        )))
                    }
                }
            }
        }
        Ok(board)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                #[allow(clippy::cast_possible_truncation)]
                let ch = match self.get(Pos::new(row as u8, col as u8)) {
                    Some(side) => side.symbol(),
                    None => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
