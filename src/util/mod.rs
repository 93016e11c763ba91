// Utility modules

pub mod encode;
pub mod filename;
