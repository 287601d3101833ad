//! Core business logic for RecoMate.
//!
//! Services take an explicit [`Session`] for every mutating call and return
//! [`recomate_common::AppResult`]; "nothing to do" cases are `Ok` values, not
//! errors.

pub mod services;
pub mod session;

pub use services::*;
pub use session::Session;
