pub mod error;
pub mod logger;
pub mod mock;
pub mod validation;
