pub mod memory;
pub mod mysql;
