//! Common type definitions and permission system types.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: lab member identifier
//! - [`ItemId`]: inventory item identifier
//! - [`RoomId`]: room identifier
//!
//! Authorization is expressed as a [`Capability`] required by a route and an
//! [`Operation`] describing what the caller attempted, both of which end up
//! in `Forbidden` error messages. Capabilities map onto the boolean role
//! flags stored on the user row; there is no hierarchy between them beyond
//! every capability implying lab membership.

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ItemId = Uuid;
pub type RoomId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// A named capability a route can require from the calling user.
///
/// Each variant corresponds to a conjunction of role flags; the mapping is
/// evaluated in exactly one place ([`crate::auth::permissions::check`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `is_part_of_lab`
    LabMember,
    /// `is_part_of_lab AND can_edit_items`
    EditItems,
    /// `is_part_of_lab AND can_edit_labs`
    EditLabs,
    /// `is_superuser OR can_edit_users`
    EditUsers,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Items,
    Rooms,
}

// Operations that can be performed on resources, used for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Take,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Users => write!(f, "user"),
            Resource::Items => write!(f, "item"),
            Resource::Rooms => write!(f, "room"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Take => write!(f, "take"),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::LabMember => write!(f, "lab membership"),
            Capability::EditItems => write!(f, "item editing"),
            Capability::EditLabs => write!(f, "lab administration"),
            Capability::EditUsers => write!(f, "user administration"),
        }
    }
}
