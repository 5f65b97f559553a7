//! Local reflection of gateway state
//!
//! The [`MirrorStore`] is a plain in-memory cache: the object list, the
//! current user, and which object is selected. It never talks to the
//! network. Callers apply a mutation only after the matching remote call has
//! succeeded, which gives read-your-own-writes within a session but is never
//! reconciled against changes made elsewhere. An explicit re-list is the
//! only way back from the gateway.
//!
//! A [`Session`] owns the mirror for the lifetime of the application and is
//! passed explicitly to whatever needs it.

mod session;
mod store;

pub use session::Session;
pub use store::{MirrorStore, User};
