//! Service layer for promotions.
//! - `promotion::repository` is the record store over the `promotion` table.
//! - `promotion::service` holds the request-level policies (filter choice,
//!   create/replace/delete semantics) on top of a repository.

pub mod errors;
pub mod promotion;
pub mod test_support;
