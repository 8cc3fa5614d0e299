//! User lifecycle: registration, profiles, listing, soft delete and role
//! changes, plus the moderator bootstrap.

mod bootstrap;
mod service;

pub use bootstrap::seed_moderator;
pub use service::{EditOutcome, UserService};
