//! Utility functions for the application

pub mod checksum;
pub mod paths;
