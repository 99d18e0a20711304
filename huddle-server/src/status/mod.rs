mod status_board;

pub use status_board::*;
