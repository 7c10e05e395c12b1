//! Game rules: plain five-in-a-row on a 15x15 grid, no captures and no
//! forbidden moves.

pub mod win;

// Re-exports for convenient access
pub use win::{find_five_positions, has_five_at_pos, has_five_in_row, winner, DIRECTIONS};
