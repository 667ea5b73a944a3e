//! Command implementations

pub mod cases;
pub mod checks;
pub mod destroy_all;
pub mod run;
pub mod workspaces;
