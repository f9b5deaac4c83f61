//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the fan-out core and the outside world. Adapters implement these ports.
//!
//! - `MessageIngestion` - validates and persists a posted message, returning
//!   the canonical stored event that gets fanned out
//! - `ChatDirectory` - channel creation/listing and the history read path
//! - `TokenValidator` - bearer token validation for sender attribution

mod chat_directory;
mod message_ingestion;
mod token_validator;

pub use chat_directory::{ChatDirectory, DirectoryError};
pub use message_ingestion::{IngestionError, MessageIngestion};
pub use token_validator::TokenValidator;
