//! Embedded schema migrator. The migration list lives in the `migrations`
//! workspace member; re-exported here so callers reach it as
//! `crate::migrator::Migrator`.

pub use migrations::Migrator;
