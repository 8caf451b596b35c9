//! Utility modules for file handling and logging

pub mod io;
pub mod logging;
