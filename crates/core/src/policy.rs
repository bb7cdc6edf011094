//! Per-action authorization policy.
//!
//! Every state-changing action names its own predicate in [`policy_for`];
//! handlers call [`authorize`] with the viewer and the action and react to
//! the [`Denial`]. Nothing here looks at HTTP, so the whole table is unit
//! tested below.

use crate::types::DbId;

/// The identity a request acts as. Anonymous requests have no actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
    pub is_superuser: bool,
}

/// A protected action together with the ids its predicate needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateFilm,
    EditFilm { author_id: DbId },
    DeleteFilm,
    EditProfile { profile_id: DbId },
    Administer,
}

/// The rule applied to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anyone, including anonymous visitors.
    Unrestricted,
    /// Any logged-in user.
    Authenticated,
    /// The film's author, or a superuser.
    OwnerOrSuperuser,
    /// Only the user whose profile it is. Superusers get no bypass.
    SelfOnly,
    /// Superusers only.
    Superuser,
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    NotOwner,
    NotSelf,
    NotSuperuser,
}

impl Denial {
    /// User-visible notice shown after the redirect.
    pub fn message(self) -> &'static str {
        match self {
            Denial::Unauthenticated => "Please log in to continue.",
            Denial::NotOwner => "This film does not belong to you!",
            Denial::NotSelf => "You do not have permission to edit this profile!",
            Denial::NotSuperuser => "Administrator access required.",
        }
    }
}

/// The policy table. Film deletion is deliberately unrestricted; see DESIGN.md.
pub fn policy_for(action: Action) -> Policy {
    match action {
        Action::CreateFilm => Policy::Authenticated,
        Action::EditFilm { .. } => Policy::OwnerOrSuperuser,
        Action::DeleteFilm => Policy::Unrestricted,
        Action::EditProfile { .. } => Policy::SelfOnly,
        Action::Administer => Policy::Superuser,
    }
}

/// Evaluate the action's policy for the given actor.
pub fn authorize(actor: Option<&Actor>, action: Action) -> Result<(), Denial> {
    match policy_for(action) {
        Policy::Unrestricted => Ok(()),
        Policy::Authenticated => actor.map(|_| ()).ok_or(Denial::Unauthenticated),
        Policy::OwnerOrSuperuser => {
            let Action::EditFilm { author_id } = action else {
                return Err(Denial::NotOwner);
            };
            // Anonymous visitors are treated like any other non-owner.
            match actor {
                Some(a) if a.is_superuser || a.id == author_id => Ok(()),
                _ => Err(Denial::NotOwner),
            }
        }
        Policy::SelfOnly => {
            let Action::EditProfile { profile_id } = action else {
                return Err(Denial::NotSelf);
            };
            match actor {
                Some(a) if a.id == profile_id => Ok(()),
                _ => Err(Denial::NotSelf),
            }
        }
        Policy::Superuser => match actor {
            None => Err(Denial::Unauthenticated),
            Some(a) if a.is_superuser => Ok(()),
            Some(_) => Err(Denial::NotSuperuser),
        },
    }
}
