pub mod entry_line;
pub mod stimulus;
