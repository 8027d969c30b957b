//! Pieces shared by every crate in the workspace: wire types for the
//! informational endpoints and the tracing subscriber setup.

pub mod types;
pub mod utils;
