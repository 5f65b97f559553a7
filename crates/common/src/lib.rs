/**
 * Access grants and the codec that stores them
 *  inside a pinned object's key/value metadata.
 * Also home to the lifecycle manager that
 *  grants, revokes and lists over a gateway.
 */
pub mod access;
/**
 * Pinning gateway clients.
 *  A trait describing the four remote calls we
 *  rely on, a Pinata implementation over HTTP,
 *  and an in-memory stand-in.
 */
pub mod gateway;
/**
 * Local mirror of the gateway's state, plus the
 *  session context that owns it for the lifetime
 *  of the application.
 */
pub mod mirror;
/**
 * Pinned objects as the rest of the system sees
 *  them: content hash, descriptive metadata and
 *  access list.
 */
pub mod object;

pub mod prelude {
    pub use crate::access::{AccessError, AccessGrant, AccessLevel, AccessManager};
    pub use crate::gateway::{Gateway, GatewayError, MemoryGateway, PinataClient, PinataConfig};
    pub use crate::mirror::{MirrorStore, Session, User};
    pub use crate::object::{ContentHash, Object, Upload};
}
