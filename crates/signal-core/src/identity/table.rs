//! Known-identity table
//!
//! Identities are configured as a flat list of identifiers in which each consecutive
//! group of `aliases_per_identity` entries belongs to one person, plus a parallel hue
//! table with one hue per person. Empty entries are placeholders that keep the groups
//! aligned. The table is built once at startup and only read afterwards.

use crate::error::IdentityError;
use crate::value_objects::{Hue, Snowflake};

/// One known person: their aliases and assigned hue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySlot {
    index: usize,
    aliases: Vec<Snowflake>,
    hue: Hue,
}

impl IdentitySlot {
    /// Position in the hue table
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn hue(&self) -> Hue {
        self.hue
    }

    pub fn aliases(&self) -> &[Snowflake] {
        &self.aliases
    }

    /// Check whether `id` is one of this identity's aliases
    pub fn matches(&self, id: Snowflake) -> bool {
        self.aliases.contains(&id)
    }
}

/// Read-only lookup table of known identities and the special role marker
#[derive(Debug, Clone, Default)]
pub struct KnownIdentityTable {
    slots: Vec<IdentitySlot>,
    aliases_per_identity: usize,
    special_role: Option<Snowflake>,
}

impl KnownIdentityTable {
    /// Build the table from the flat identifier list and the parallel hue table
    ///
    /// `ids[i]` belongs to identity `i / aliases_per_identity`; `None` entries are
    /// placeholders. There is one identity per hue.
    pub fn from_flat(
        ids: &[Option<Snowflake>],
        aliases_per_identity: usize,
        hues: &[Hue],
        special_role: Option<Snowflake>,
    ) -> Result<Self, IdentityError> {
        if aliases_per_identity == 0 {
            return Err(IdentityError::ZeroAliasCount);
        }

        let identities = ids.len().div_ceil(aliases_per_identity);
        if identities > hues.len() {
            return Err(IdentityError::HueCountMismatch {
                identities,
                hues: hues.len(),
            });
        }

        let mut slots: Vec<IdentitySlot> = hues
            .iter()
            .enumerate()
            .map(|(index, hue)| IdentitySlot {
                index,
                aliases: Vec::with_capacity(aliases_per_identity),
                hue: *hue,
            })
            .collect();

        for (position, id) in ids.iter().enumerate() {
            let Some(id) = id else { continue };
            if slots.iter().any(|slot| slot.matches(*id)) {
                return Err(IdentityError::DuplicateIdentifier(*id));
            }
            slots[position / aliases_per_identity].aliases.push(*id);
        }

        Ok(Self {
            slots,
            aliases_per_identity,
            special_role,
        })
    }

    /// Find the identity that owns `id`
    pub fn resolve(&self, id: Snowflake) -> Option<&IdentitySlot> {
        self.slots.iter().find(|slot| slot.matches(id))
    }

    pub fn slot(&self, index: usize) -> Option<&IdentitySlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[IdentitySlot] {
        &self.slots
    }

    pub fn special_role(&self) -> Option<Snowflake> {
        self.special_role
    }

    /// Check whether `role` is the special mention role
    pub fn is_special_role(&self, role: Snowflake) -> bool {
        self.special_role == Some(role)
    }

    /// Check whether any of `roles` is the special mention role
    pub fn has_special_role(&self, roles: &[Snowflake]) -> bool {
        self.special_role.is_some_and(|special| roles.contains(&special))
    }

    pub fn aliases_per_identity(&self) -> usize {
        self.aliases_per_identity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
