pub mod conversation;
pub mod enums;
pub mod prescreening;

pub use conversation::*;
pub use prescreening::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
