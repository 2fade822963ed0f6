//! Ownership resolver over the three visibility tiers.
//!
//! # Responsibility
//! - Implement the per-tier ownership predicate.
//! - Dispatch on a pictogram's access level for read, write and image-read
//!   authorization alike.
//!
//! # Invariants
//! - `Public` resolves to allowed for every caller, anonymous included.
//! - `Protected` requires the caller's department to own the pictogram.
//! - `Private` requires the caller to own the pictogram.
//! - A tier whose ownership scope disagrees with it resolves to denied
//!   (fail closed on corrupt data), rather than raising.

use crate::model::identity::Identity;
use crate::model::pictogram::{AccessLevel, OwnershipScope, Pictogram};

/// Decides whether `caller` may access `pictogram`.
///
/// Side-effect-free decision function; translation into an access-denied
/// error is left to the caller. `None` marks an anonymous caller.
pub fn resolve_access(pictogram: &Pictogram, caller: Option<&Identity>) -> bool {
    match pictogram.access_level {
        AccessLevel::Public => true,
        AccessLevel::Protected => resolve_protected(pictogram, caller),
        AccessLevel::Private => resolve_private(pictogram, caller),
    }
}

fn resolve_protected(pictogram: &Pictogram, caller: Option<&Identity>) -> bool {
    let Some(department) = caller.and_then(|identity| identity.department) else {
        return false;
    };
    match pictogram.owner {
        OwnershipScope::Department(owner) => owner == department,
        // Scope disagrees with the PROTECTED tier: deny.
        _ => false,
    }
}

fn resolve_private(pictogram: &Pictogram, caller: Option<&Identity>) -> bool {
    let Some(identity) = caller else {
        return false;
    };
    match pictogram.owner {
        OwnershipScope::User(owner) => owner == identity.id,
        // Scope disagrees with the PRIVATE tier: deny.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_access;
    use crate::model::identity::Identity;
    use crate::model::pictogram::{AccessLevel, OwnershipScope, Pictogram};
    use uuid::Uuid;

    #[test]
    fn public_is_allowed_for_everyone() {
        let pictogram = Pictogram::new("sun", AccessLevel::Public, OwnershipScope::None);
        let stranger = Identity::new(Uuid::new_v4(), "stranger");

        assert!(resolve_access(&pictogram, None));
        assert!(resolve_access(&pictogram, Some(&stranger)));
    }

    #[test]
    fn private_is_allowed_only_for_the_owning_user() {
        let owner = Identity::new(Uuid::new_v4(), "owner");
        let other = Identity::new(Uuid::new_v4(), "other");
        let pictogram = Pictogram::new(
            "diary",
            AccessLevel::Private,
            OwnershipScope::User(owner.id),
        );

        assert!(resolve_access(&pictogram, Some(&owner)));
        assert!(!resolve_access(&pictogram, Some(&other)));
        assert!(!resolve_access(&pictogram, None));
    }

    #[test]
    fn protected_requires_matching_department() {
        let department = Uuid::new_v4();
        let member = Identity::with_department(Uuid::new_v4(), "member", department);
        let outsider = Identity::with_department(Uuid::new_v4(), "outsider", Uuid::new_v4());
        let no_department = Identity::new(Uuid::new_v4(), "solo");
        let pictogram = Pictogram::new(
            "ward plan",
            AccessLevel::Protected,
            OwnershipScope::Department(department),
        );

        assert!(resolve_access(&pictogram, Some(&member)));
        assert!(!resolve_access(&pictogram, Some(&outsider)));
        assert!(!resolve_access(&pictogram, Some(&no_department)));
        assert!(!resolve_access(&pictogram, None));
    }

    #[test]
    fn corrupt_scope_fails_closed() {
        let identity = Identity::new(Uuid::new_v4(), "anyone");

        // PRIVATE with no user association: denied for everyone.
        let orphan_private = Pictogram::new("lost", AccessLevel::Private, OwnershipScope::None);
        assert!(!resolve_access(&orphan_private, Some(&identity)));

        // PROTECTED pointing at a user scope: denied even for that user.
        let crossed = Pictogram::new(
            "crossed",
            AccessLevel::Protected,
            OwnershipScope::User(identity.id),
        );
        let with_department =
            Identity::with_department(identity.id, "anyone", Uuid::new_v4());
        assert!(!resolve_access(&crossed, Some(&with_department)));
    }
}
