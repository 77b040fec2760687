//! Database record models matching table schemas.
//!
//! Each entity has three structs: a `*CreateDBRequest`, a `*UpdateDBRequest`,
//! and a `*DBResponse`. Database models are distinct from API models so the
//! storage and API representations can evolve independently; the create/update
//! requests carry `From` conversions from their API counterparts that enforce
//! API-level invariants (e.g. item creation forces the owner to null).
//!
//! Update requests encode partial-update semantics explicitly: a plain
//! `Option<T>` field means "absent = untouched" for non-nullable columns,
//! while `Option<Option<T>>` distinguishes "absent" from "explicitly null"
//! for nullable columns.

pub mod items;
pub mod rooms;
pub mod users;
