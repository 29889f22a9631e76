//! Database models, schema and sample data

pub mod init;
pub mod models;
pub mod seed;

pub use init::*;
pub use models::*;
pub use seed::seed_sample_data;
