//! Everything that touches the file system: finding batch files, reading
//! them and writing the sorted result.

pub mod discover;
pub mod error;
pub mod load;
pub mod write;
