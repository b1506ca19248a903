// src/commands/mod.rs
//
// Popup operations, organized by feature. Reads go straight to the database;
// writes are routed through the coordinator.

mod dtos;
pub mod history;
pub mod schedule;
pub mod settings;
pub mod status;

pub use dtos::*;
pub use history::*;
pub use schedule::*;
pub use settings::*;
pub use status::*;
