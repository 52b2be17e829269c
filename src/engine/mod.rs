pub mod calculation;
pub mod parity;
pub mod types;
pub mod verdict;
