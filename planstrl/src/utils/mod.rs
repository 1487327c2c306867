pub mod fs;

pub use fs::{sanitize_identifier, write_atomically};
