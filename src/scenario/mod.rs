pub mod decision;
pub mod projection;
pub mod sensitivity;
pub mod types;
