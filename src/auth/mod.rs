//! Authentication and authorization core.
//!
//! - **Password hashing**: Argon2id, run off the async executor
//! - **Tokens**: HS256-signed JWTs carrying `{id, login, role, exp}`
//! - **Login**: credential lookup, verification and token issuance
//! - **Request authentication**: `Authorization: Bearer` header to [`Identity`]
//! - **Guard**: pure ALLOW/DENY decisions per operation
//!
//! ## Security Model
//!
//! - Tokens are verified statelessly; there is no server-side session or
//!   revocation list, so a token stays valid until its expiry
//! - A token's role is fixed at issuance; role changes apply on next login
//! - Denials expose only a coarse tag, never the reason in detail
//!
//! ## Usage
//!
//! ```ignore
//! let identity = authenticator.authenticate(headers.get("authorization"))?;
//! let ctx = RequestContext::new(identity).with_target(target_id);
//! guard::authorize(&ctx, Operation::DeleteUser)?;
//! ```

mod context;
mod extractor;
pub mod guard;
pub mod password;
mod service;
pub mod token;

pub use context::{Identity, RequestContext};
pub use extractor::RequestAuthenticator;
pub use guard::{Decision, DenyReason, Operation, authorize, decide};
pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthService, IssuedToken};
pub use token::{TokenCodec, TokenError, TokenPayload};
