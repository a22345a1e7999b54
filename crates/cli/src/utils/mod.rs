//! Utility functions for the tagreader CLI

pub mod reader;
pub mod report;
