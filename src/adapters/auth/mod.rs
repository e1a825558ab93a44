//! Authentication adapters.
//!
//! Implementations of the `IdentityVerifier` port:
//!
//! - `jwt` - HS256 tokens signed with the configured secret
//! - `mock` - Test implementation with fixed tokens

mod jwt;
mod mock;

pub use jwt::{Claims, JwtIdentityVerifier};
pub use mock::MockIdentityVerifier;
