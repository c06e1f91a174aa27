//! Service clients for the managed platform.

pub mod completion_service;
pub mod search_service;
