pub mod types;
pub mod writer;
