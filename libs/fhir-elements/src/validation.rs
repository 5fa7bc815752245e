//! Validation collaborator contract
//!
//! Records are structurally typed but not semantically checked. Cardinality,
//! terminology bindings and invariants belong to an external validator that
//! is plugged in through [`Validator`]. The model calls it only from
//! [`RecordBuilder::build_or_throw`](crate::builder::RecordBuilder::build_or_throw)
//! and [`validate_or_throw`], and returns its error untouched.

use async_trait::async_trait;
use std::convert::Infallible;

/// Checks a built record, failing with a validator-specific error.
///
/// Validation may be asynchronous (e.g. terminology lookups).
#[async_trait]
pub trait Validator<T: ?Sized + Sync>: Send + Sync {
    type Error: Send;

    async fn validate_or_throw(&self, record: &T) -> Result<(), Self::Error>;
}

/// Validator that accepts every record
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl<T: ?Sized + Sync> Validator<T> for AcceptAll {
    type Error = Infallible;

    async fn validate_or_throw(&self, _record: &T) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Runs `validator` against an already built record.
pub async fn validate_or_throw<T, V>(record: &T, validator: &V) -> Result<(), V::Error>
where
    T: ?Sized + Sync,
    V: Validator<T> + ?Sized,
{
    validator.validate_or_throw(record).await
}
