pub mod config;
pub mod identity;
pub mod openai;
pub mod repository;

pub use config::*;
pub use identity::*;
pub use openai::*;
pub use repository::*;
