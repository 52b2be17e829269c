pub mod bridge;
pub mod errors;
