//! Access grants layered on top of gateway metadata
//!
//! The gateway has no notion of per-object permissions, so an object's
//! access list lives as a serialized array under a single metadata key.
//!
//! - **[`AccessGrant`]**: one (grantee, level, expiry) entry
//! - **[`codec`]**: reads and writes the list in the metadata bag
//! - **[`AccessManager`]**: grant / revoke / list composed over a [`Gateway`](crate::gateway::Gateway)
//!
//! ## Trust Model
//!
//! Nothing here is enforced. Anyone holding the gateway credentials can read
//! and rewrite every object's access list, and expiry is only a display
//! hint. Listing by grantee is a convenience filter, not an authorization
//! boundary.

pub mod codec;
mod grant;
mod manager;

pub use codec::AccessCodecError;
pub use grant::{AccessGrant, AccessLevel, AccessLevelError, DEFAULT_GRANT_DAYS, OWNER_GRANT_DAYS};
pub use manager::{AccessError, AccessManager};
