pub mod common;
pub mod detection;
pub mod health;
pub mod nutrition;
pub mod pipeline;
