pub mod client;
pub mod types;

pub use client::MsoClient;
pub use types::{PatchOp, PatchOpKind};
