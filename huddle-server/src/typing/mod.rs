mod typing_tracker;

pub use typing_tracker::*;
