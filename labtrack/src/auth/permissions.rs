//! Capability policy and the `RequiresPermission` extractor.
//!
//! Every route's authorization requirement is the pair (resource, operation).
//! [`required_capability`] maps that pair onto a [`Capability`], and
//! [`check`] evaluates the capability against the caller's role flags. Both
//! live here so the whole policy is auditable in one screenful.
//!
//! Routes that authorize before touching data declare the requirement in
//! their signature:
//!
//! ```ignore
//! pub async fn create_room(
//!     State(state): State<AppState>,
//!     RequiresPermission { user, .. }: RequiresPermission<resource::Rooms, operation::Create>,
//!     Json(room): Json<RoomCreate>,
//! ) -> Result<Json<RoomResponse>> { ... }
//! ```
//!
//! Item routes check existence before permission, so they extract
//! [`CurrentUser`] directly and call [`require`] after the fetch.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::{Capability, Operation, Resource},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

/// The capability a caller needs for an operation on a resource.
pub fn required_capability(resource: Resource, operation: Operation) -> Capability {
    match (resource, operation) {
        (Resource::Items, Operation::Create | Operation::Update | Operation::Delete) => Capability::EditItems,
        (Resource::Items, Operation::Read | Operation::Take) => Capability::LabMember,
        (Resource::Rooms, Operation::Read) => Capability::LabMember,
        (Resource::Rooms, _) => Capability::EditLabs,
        (Resource::Users, _) => Capability::EditUsers,
    }
}

/// Evaluate a capability against the caller's role flags.
///
/// Flags are independent booleans combined with AND; there is no hierarchy.
/// The superuser flag substitutes only for user administration, not for lab
/// membership - a superuser outside the lab still cannot see its inventory.
pub fn check(user: &CurrentUser, capability: Capability) -> bool {
    match capability {
        Capability::LabMember => user.is_part_of_lab,
        Capability::EditItems => user.is_part_of_lab && user.can_edit_items,
        Capability::EditLabs => user.is_part_of_lab && user.can_edit_labs,
        Capability::EditUsers => user.is_superuser || user.can_edit_users,
    }
}

/// Require the capability for (resource, operation), or fail with `Forbidden`.
pub fn require(user: &CurrentUser, resource: Resource, operation: Operation) -> Result<()> {
    let capability = required_capability(resource, operation);
    if check(user, capability) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            required: capability,
            action: operation,
            resource: resource.to_string(),
        })
    }
}

/// Marker types naming the resource a route operates on.
pub mod resource {
    pub struct Users;
    pub struct Items;
    pub struct Rooms;
}

/// Marker types naming the operation a route performs.
pub mod operation {
    pub struct Create;
    pub struct Read;
    pub struct Update;
    pub struct Delete;
    pub struct Take;
}

/// Compile-time marker to runtime [`Resource`] mapping.
pub trait ResourceMarker {
    const RESOURCE: Resource;
}

/// Compile-time marker to runtime [`Operation`] mapping.
pub trait OperationMarker {
    const OPERATION: Operation;
}

impl ResourceMarker for resource::Users {
    const RESOURCE: Resource = Resource::Users;
}
impl ResourceMarker for resource::Items {
    const RESOURCE: Resource = Resource::Items;
}
impl ResourceMarker for resource::Rooms {
    const RESOURCE: Resource = Resource::Rooms;
}

impl OperationMarker for operation::Create {
    const OPERATION: Operation = Operation::Create;
}
impl OperationMarker for operation::Read {
    const OPERATION: Operation = Operation::Read;
}
impl OperationMarker for operation::Update {
    const OPERATION: Operation = Operation::Update;
}
impl OperationMarker for operation::Delete {
    const OPERATION: Operation = Operation::Delete;
}
impl OperationMarker for operation::Take {
    const OPERATION: Operation = Operation::Take;
}

/// Extractor that authenticates the caller and requires a capability in one
/// step. The authenticated user is available through the `user` field.
pub struct RequiresPermission<R, O> {
    pub user: CurrentUser,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: ResourceMarker + Send,
    O: OperationMarker + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        require(&user, R::RESOURCE, O::OPERATION)?;
        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_with_flags(is_superuser: bool, is_part_of_lab: bool, can_edit_items: bool, can_edit_labs: bool, can_edit_users: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "flags@example.com".to_string(),
            full_name: None,
            is_active: true,
            is_superuser,
            is_part_of_lab,
            can_edit_items,
            can_edit_labs,
            can_edit_users,
        }
    }

    #[test]
    fn test_capability_mapping() {
        assert_eq!(required_capability(Resource::Items, Operation::Create), Capability::EditItems);
        assert_eq!(required_capability(Resource::Items, Operation::Take), Capability::LabMember);
        assert_eq!(required_capability(Resource::Items, Operation::Read), Capability::LabMember);
        assert_eq!(required_capability(Resource::Rooms, Operation::Read), Capability::LabMember);
        assert_eq!(required_capability(Resource::Rooms, Operation::Delete), Capability::EditLabs);
        assert_eq!(required_capability(Resource::Users, Operation::Update), Capability::EditUsers);
    }

    #[test]
    fn test_flags_are_independent() {
        // Lab member without edit flags can read but not edit
        let member = user_with_flags(false, true, false, false, false);
        assert!(check(&member, Capability::LabMember));
        assert!(!check(&member, Capability::EditItems));
        assert!(!check(&member, Capability::EditLabs));

        // Edit flag without lab membership grants nothing
        let outsider = user_with_flags(false, false, true, true, false);
        assert!(!check(&outsider, Capability::LabMember));
        assert!(!check(&outsider, Capability::EditItems));
        assert!(!check(&outsider, Capability::EditLabs));
    }

    #[test]
    fn test_superuser_only_covers_user_admin() {
        let superuser = user_with_flags(true, false, false, false, false);
        assert!(check(&superuser, Capability::EditUsers));
        assert!(!check(&superuser, Capability::LabMember));
        assert!(!check(&superuser, Capability::EditItems));
    }

    #[test]
    fn test_require_reports_forbidden() {
        let member = user_with_flags(false, true, false, false, false);
        let err = require(&member, Resource::Items, Operation::Create).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

        assert!(require(&member, Resource::Items, Operation::Take).is_ok());
    }
}
