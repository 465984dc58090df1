//! Domain errors

mod identity_error;

pub use identity_error::IdentityError;
