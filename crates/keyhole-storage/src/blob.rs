pub mod fs;
pub mod memory;
