//! Known identities and their signal colors

mod table;

pub use table::{IdentitySlot, KnownIdentityTable};
