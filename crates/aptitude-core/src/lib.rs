pub mod catalog;
pub mod error;
pub mod labels;
pub mod mcp_api;
pub mod model;
pub mod scorer;
