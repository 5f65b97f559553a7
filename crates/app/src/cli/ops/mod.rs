pub mod access;
pub mod grant;
pub mod init;
pub mod list;
pub mod render;
pub mod revoke;
pub mod upload;
pub mod version;

pub use access::Access;
pub use grant::Grant;
pub use init::Init;
pub use list::List;
pub use revoke::Revoke;
pub use upload::Upload;
pub use version::Version;
