//! API endpoint handlers.
//!
//! Each module corresponds to one widget or collaborator of the site.

pub mod confirmation;
pub mod health;
pub mod prescreening;
pub mod sessions;
