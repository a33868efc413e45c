pub mod cell;
pub mod combined;
pub mod text_utils;

pub use cell::Cell;
pub use combined::CombinedCell;
