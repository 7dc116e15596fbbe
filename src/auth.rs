//! Auth-domain identifiers, scope sets, secrets, access tokens, and user profiles.

pub mod id;
pub mod scope;
pub mod secret;
pub mod token;
pub mod user;

pub use id::*;
pub use scope::*;
pub use secret::*;
pub use token::*;
pub use user::*;
