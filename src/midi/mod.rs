pub mod decoder;
pub mod handler;
