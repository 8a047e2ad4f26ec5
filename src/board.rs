use std::fmt;

pub const BOARD_SIZE: usize = 19;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// One of the two seats that may actually place stones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// The identity the server assigned to this connection. The first two
/// connections become players, everyone after that spectates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Player(Player),
    Spectator,
}

impl Seat {
    pub fn player(&self) -> Option<Player> {
        match self {
            Seat::Player(p) => Some(*p),
            Seat::Spectator => None,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::Player(p) => write!(f, "{}", p),
            Seat::Spectator => write!(f, "spectator"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Stone(Player),
}

impl Cell {
    pub fn value(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Stone(p) => p.value(),
        }
    }
}

/// The 19x19 grid. Plain value type with a single owner; every cell always
/// holds a valid occupancy because the decoder validates wire values before
/// they get here. Indices out of [0, 19) are a programming error and panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Sets every cell back to empty. Idempotent.
    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Overwrites the whole grid from a row-major snapshot of exactly
    /// [`CELL_COUNT`] cells.
    pub fn load_snapshot(&mut self, snapshot: &[Cell]) {
        assert_eq!(snapshot.len(), CELL_COUNT, "snapshot must cover the board");
        for (i, cell) in snapshot.iter().enumerate() {
            self.cells[i / BOARD_SIZE][i % BOARD_SIZE] = *cell;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|c| *c == Cell::Empty))
    }
}
