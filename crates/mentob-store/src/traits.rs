//! Data-access traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{InterpretationRecord, NewInterpretation, QuotaRecord};

/// Per-user, per-day quota counters.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are called
/// concurrently from request tasks. Policy (limits, unlimited users) lives in
/// [`QuotaGate`](crate::QuotaGate), not in the store.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Fetch the record for `(user_id, date)`, creating it with a zero count
    /// if absent.
    async fn get_or_create(&self, user_id: &str, date: &str) -> Result<QuotaRecord, StoreError>;

    /// Fetch the record for `(user_id, date)` without creating it.
    async fn find(&self, user_id: &str, date: &str) -> Result<Option<QuotaRecord>, StoreError>;

    /// Atomically increment the counter if it is below `limit`.
    ///
    /// Returns the updated record, or `None` when the ceiling was already
    /// reached (nothing is mutated in that case). The record must exist.
    async fn increment_within(
        &self,
        user_id: &str,
        date: &str,
        limit: u32,
    ) -> Result<Option<QuotaRecord>, StoreError>;

    /// Reset a day's counter to zero. Returns `false` if no record exists.
    async fn reset(&self, user_id: &str, date: &str) -> Result<bool, StoreError>;
}

/// Append-only log of completed readings.
#[async_trait]
pub trait InterpretationStore: Send + Sync {
    /// Persist a completed reading, assigning its id and creation time.
    async fn create(&self, new: NewInterpretation) -> Result<InterpretationRecord, StoreError>;

    /// Replace the interpretation text of an existing record.
    ///
    /// This is the correction path; the service itself never calls it.
    /// Returns `false` if no record has the given id.
    async fn update_interpretation(&self, id: &str, text: &str) -> Result<bool, StoreError>;

    /// A user's readings, newest first, at most `limit`.
    async fn list_by_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<InterpretationRecord>, StoreError>;

    /// Look up a reading by id. No ownership check is made.
    async fn get(&self, id: &str) -> Result<Option<InterpretationRecord>, StoreError>;

    /// Number of readings a user completed on a `YYYY-MM-DD` UTC day.
    async fn count_on_day(&self, user_id: &str, date: &str) -> Result<u64, StoreError>;
}

/// A backend providing both quota and interpretation storage.
pub trait Store: QuotaStore + InterpretationStore {}

impl<T: QuotaStore + InterpretationStore + ?Sized> Store for T {}

#[async_trait]
impl<S: QuotaStore + ?Sized> QuotaStore for Arc<S> {
    #[inline]
    async fn get_or_create(&self, user_id: &str, date: &str) -> Result<QuotaRecord, StoreError> {
        (**self).get_or_create(user_id, date).await
    }

    #[inline]
    async fn find(&self, user_id: &str, date: &str) -> Result<Option<QuotaRecord>, StoreError> {
        (**self).find(user_id, date).await
    }

    #[inline]
    async fn increment_within(
        &self,
        user_id: &str,
        date: &str,
        limit: u32,
    ) -> Result<Option<QuotaRecord>, StoreError> {
        (**self).increment_within(user_id, date, limit).await
    }

    #[inline]
    async fn reset(&self, user_id: &str, date: &str) -> Result<bool, StoreError> {
        (**self).reset(user_id, date).await
    }
}

#[async_trait]
impl<S: QuotaStore + ?Sized> QuotaStore for Box<S> {
    #[inline]
    async fn get_or_create(&self, user_id: &str, date: &str) -> Result<QuotaRecord, StoreError> {
        (**self).get_or_create(user_id, date).await
    }

    #[inline]
    async fn find(&self, user_id: &str, date: &str) -> Result<Option<QuotaRecord>, StoreError> {
        (**self).find(user_id, date).await
    }

    #[inline]
    async fn increment_within(
        &self,
        user_id: &str,
        date: &str,
        limit: u32,
    ) -> Result<Option<QuotaRecord>, StoreError> {
        (**self).increment_within(user_id, date, limit).await
    }

    #[inline]
    async fn reset(&self, user_id: &str, date: &str) -> Result<bool, StoreError> {
        (**self).reset(user_id, date).await
    }
}

#[async_trait]
impl<S: InterpretationStore + ?Sized> InterpretationStore for Arc<S> {
    #[inline]
    async fn create(&self, new: NewInterpretation) -> Result<InterpretationRecord, StoreError> {
        (**self).create(new).await
    }

    #[inline]
    async fn update_interpretation(&self, id: &str, text: &str) -> Result<bool, StoreError> {
        (**self).update_interpretation(id, text).await
    }

    #[inline]
    async fn list_by_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<InterpretationRecord>, StoreError> {
        (**self).list_by_user(user_id, limit).await
    }

    #[inline]
    async fn get(&self, id: &str) -> Result<Option<InterpretationRecord>, StoreError> {
        (**self).get(id).await
    }

    #[inline]
    async fn count_on_day(&self, user_id: &str, date: &str) -> Result<u64, StoreError> {
        (**self).count_on_day(user_id, date).await
    }
}

#[async_trait]
impl<S: InterpretationStore + ?Sized> InterpretationStore for Box<S> {
    #[inline]
    async fn create(&self, new: NewInterpretation) -> Result<InterpretationRecord, StoreError> {
        (**self).create(new).await
    }

    #[inline]
    async fn update_interpretation(&self, id: &str, text: &str) -> Result<bool, StoreError> {
        (**self).update_interpretation(id, text).await
    }

    #[inline]
    async fn list_by_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<InterpretationRecord>, StoreError> {
        (**self).list_by_user(user_id, limit).await
    }

    #[inline]
    async fn get(&self, id: &str) -> Result<Option<InterpretationRecord>, StoreError> {
        (**self).get(id).await
    }

    #[inline]
    async fn count_on_day(&self, user_id: &str, date: &str) -> Result<u64, StoreError> {
        (**self).count_on_day(user_id, date).await
    }
}
