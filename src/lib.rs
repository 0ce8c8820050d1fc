pub mod compiler;
pub mod events;
pub mod exporters;
pub mod importer;
pub mod scene;
