pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Access, Grant, Init, List, Revoke, Upload, Version};
