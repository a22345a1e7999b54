//! Command implementations for the tagreader CLI

mod list;
mod scan;

pub use list::list_command;
pub use scan::scan_command;
