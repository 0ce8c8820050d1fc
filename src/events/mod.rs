pub mod contexts;
pub mod phase;
pub mod registry;
pub mod result;
