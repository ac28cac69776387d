//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lines::LineAnalyzer;

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' | '0' => Some(Cell::Empty),
            'X' | 'x' | '1' => Some(Cell::X),
            'O' | 'o' | '2' => Some(Cell::O),
            _ => None,
        }
    }

    pub fn to_player(self) -> Option<Player> {
        match self {
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
            Cell::Empty => None,
        }
    }
}

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Convert player to cell
    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// Board state: nine cells in row-major order.
///
/// ```text
/// 0 | 1 | 2
/// 3 | 4 | 5
/// 6 | 7 | 8
/// ```
///
/// The player to move is not stored; X always opens, so it follows from
/// the parity of occupied cells. This keeps the value usable verbatim as a
/// Q-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
}

/// Count of each piece type on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PieceCount {
    x: usize,
    o: usize,
}

impl BoardState {
    /// The all-empty board
    pub fn initial() -> Self {
        BoardState {
            cells: [Cell::Empty; 9],
        }
    }

    fn count_pieces(cells: &[Cell; 9]) -> PieceCount {
        let mut count = PieceCount { x: 0, o: 0 };
        for cell in cells {
            match cell {
                Cell::X => count.x += 1,
                Cell::O => count.o += 1,
                Cell::Empty => {}
            }
        }
        count
    }

    /// Create a board from a string representation.
    ///
    /// Whitespace is ignored; exactly nine cells must remain, drawn from
    /// `.XO` (or the numeric `012` encoding). Piece counts must respect
    /// alternation with X opening.
    ///
    /// # Errors
    ///
    /// Returns error if the cell count is wrong, a character is not a valid
    /// cell, or the piece counts are impossible under legal play.
    pub fn from_string(s: &str) -> Result<Self, crate::Error> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: chars.len(),
                context: s.to_string(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (i, &c) in chars.iter().enumerate() {
            cells[i] = Cell::from_char(c).ok_or_else(|| crate::Error::InvalidCellCharacter {
                character: c,
                position: i,
                context: s.to_string(),
            })?;
        }

        let count = Self::count_pieces(&cells);
        if count.x != count.o && count.x != count.o + 1 {
            return Err(crate::Error::InvalidPieceCounts {
                x_count: count.x,
                o_count: count.o,
            });
        }

        Ok(BoardState { cells })
    }

    /// Nine-character encoding (`.XO`), the inverse of [`BoardState::from_string`]
    pub fn encode(&self) -> String {
        self.cells.iter().map(|&c| c.to_char()).collect()
    }

    /// Player whose turn it is, by parity of occupied cells
    pub fn to_move(&self) -> Player {
        let count = Self::count_pieces(&self.cells);
        if count.x > count.o {
            Player::O
        } else {
            Player::X
        }
    }

    /// Count the number of occupied cells on the board.
    pub fn occupied_count(&self) -> usize {
        let count = Self::count_pieces(&self.cells);
        count.x + count.o
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// All empty cells in ascending order; empty iff the board is full
    pub fn legal_actions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Place `marker` at `action` and return the new board
    #[must_use = "apply returns a new board state; `self` is left unchanged"]
    pub fn apply(&self, action: usize, marker: Player) -> Result<BoardState, crate::Error> {
        if action >= 9 || !self.is_empty(action) {
            return Err(crate::Error::InvalidMove { position: action });
        }

        let mut new_state = *self;
        new_state.cells[action] = marker.to_cell();
        Ok(new_state)
    }

    /// Place the marker of the player to move at `action`
    #[must_use = "make_move returns a new board state; `self` is left unchanged"]
    pub fn make_move(&self, action: usize) -> Result<BoardState, crate::Error> {
        self.apply(action, self.to_move())
    }

    /// Check if a player has won
    pub fn has_won(&self, player: Player) -> bool {
        LineAnalyzer::has_won(&self.cells, player)
    }

    /// The completed line, if any (rows, then columns, then diagonals)
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        LineAnalyzer::first_complete_line(&self.cells)
    }

    /// Get the winner if there is one
    pub fn winner(&self) -> Option<Player> {
        self.winning_line()
            .and_then(|[first, _, _]| self.cells[first].to_player())
    }

    /// Check if the game is over (win or full board)
    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || !self.cells.contains(&Cell::Empty)
    }

    /// Check if the position is a draw (all cells filled, no winner)
    pub fn is_draw(&self) -> bool {
        !self.cells.contains(&Cell::Empty) && self.winner().is_none()
    }

    /// Multi-line grid rendering (`X | . | O` rows separated by dashes)
    pub fn render(&self) -> String {
        self.cells
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_char().to_string())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n---------\n")
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1).is_multiple_of(3) && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board() {
        let board = BoardState::initial();
        assert_eq!(board.to_move(), Player::X);
        assert!(board.cells.iter().all(|&c| c == Cell::Empty));
        assert_eq!(board.legal_actions(), (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_apply() {
        let board = BoardState::initial();

        let new_board = board.apply(4, Player::X).unwrap();
        assert_eq!(new_board.cells[4], Cell::X);
        assert_eq!(new_board.to_move(), Player::O);
        assert_eq!(board.cells[4], Cell::Empty);

        let occupied = new_board.apply(4, Player::O);
        assert!(matches!(
            occupied,
            Err(crate::Error::InvalidMove { position: 4 })
        ));

        let out_of_range = new_board.apply(9, Player::O);
        assert!(matches!(
            out_of_range,
            Err(crate::Error::InvalidMove { position: 9 })
        ));
    }

    #[test]
    fn test_legal_actions_shrink() {
        let mut board = BoardState::initial();
        board = board.make_move(0).unwrap();
        assert_eq!(board.legal_actions().len(), 8);
        assert!(!board.legal_actions().contains(&0));

        board = board.make_move(4).unwrap();
        assert_eq!(board.legal_actions(), vec![1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_legal_actions_ignore_winner() {
        let board = BoardState::from_string("XXXOO....").unwrap();
        assert_eq!(board.legal_actions(), vec![5, 6, 7, 8]);
        assert!(board.is_terminal());
    }

    #[test]
    fn test_win_detection_vertical() {
        let mut board = BoardState::initial();
        for pos in [0, 1, 2, 4, 5, 7] {
            board = board.make_move(pos).unwrap();
        }

        assert!(board.is_terminal());
        assert_eq!(board.winner(), Some(Player::O));
        assert_eq!(board.winning_line(), Some([1, 4, 7]));
    }

    #[test]
    fn test_draw_detection() {
        let mut board = BoardState::initial();
        for pos in [0, 1, 2, 4, 3, 6, 5, 8, 7] {
            board = board.make_move(pos).unwrap();
        }

        assert!(board.is_terminal());
        assert!(board.is_draw());
        assert_eq!(board.winner(), None);
        assert!(board.legal_actions().is_empty());
    }

    #[test]
    fn test_from_string() {
        let board = BoardState::from_string("XOX......").unwrap();
        assert_eq!(board.cells[0], Cell::X);
        assert_eq!(board.cells[1], Cell::O);
        assert_eq!(board.to_move(), Player::O);

        let numeric = BoardState::from_string("1 2 1  0 0 0  0 0 0").unwrap();
        assert_eq!(numeric, board);

        assert!(matches!(
            BoardState::from_string("XO"),
            Err(crate::Error::InvalidBoardLength { got: 2, .. })
        ));
        let too_long = BoardState::from_string("X.........").unwrap_err();
        assert!(matches!(too_long, crate::Error::InvalidBoardLength { got: 10, .. }));
        assert!(too_long.to_string().contains("expected 9 cells, got 10"));
        assert!(!too_long.to_string().contains("too short"));
        assert_eq!(Cell::from_char(' '), None);
        assert!(matches!(
            BoardState::from_string("XOZ......"),
            Err(crate::Error::InvalidCellCharacter { character: 'Z', .. })
        ));
        assert!(matches!(
            BoardState::from_string("XXX......"),
            Err(crate::Error::InvalidPieceCounts { x_count: 3, o_count: 0 })
        ));
        assert!(BoardState::from_string("O........").is_err());
    }

    #[test]
    fn test_encode_roundtrip() {
        let board = BoardState::from_string("XO..X...O").unwrap();
        assert_eq!(board.encode(), "XO..X...O");
        assert_eq!(BoardState::from_string(&board.encode()).unwrap(), board);
        assert_eq!(BoardState::initial().encode(), ".........");
    }

    #[test]
    fn test_display_and_render() {
        let board = BoardState::from_string("XOX.O.X..").unwrap();
        assert_eq!(format!("{board}"), "XOX\n.O.\nX..");
        assert_eq!(
            board.render(),
            "X | O | X\n---------\n. | O | .\n---------\nX | . | ."
        );
    }

    #[test]
    fn test_player_alternation() {
        let mut board = BoardState::initial();
        let mut expected = Player::X;
        for pos in [0, 1, 2, 3] {
            assert_eq!(board.to_move(), expected);
            board = board.make_move(pos).unwrap();
            expected = expected.opponent();
        }
    }
}
