//! Store port for server descriptors.

use crate::registry::domain::{RegistrationId, ServerDescriptor, ServerKind, ServerName};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for descriptor store operations.
pub type DescriptorStoreResult<T> = Result<T, DescriptorStoreError>;

/// Keyed storage of server descriptors.
///
/// Implementations must serialize mutations so that concurrent operations on
/// the same name are applied one at a time, and `list` must observe a
/// consistent snapshot.
#[async_trait]
pub trait DescriptorStore: Send + Sync {
    /// Inserts a descriptor, replacing any entry with the same name.
    ///
    /// A replaced name moves to the end of the registration order.
    async fn put(&self, descriptor: &ServerDescriptor) -> DescriptorStoreResult<()>;

    /// Finds a descriptor by name.
    async fn get(&self, name: &ServerName) -> DescriptorStoreResult<Option<ServerDescriptor>>;

    /// Removes a descriptor by name, returning it if it was present.
    async fn remove(&self, name: &ServerName) -> DescriptorStoreResult<Option<ServerDescriptor>>;

    /// Lists descriptors in registration order, optionally filtered by kind.
    async fn list(&self, kind: Option<ServerKind>) -> DescriptorStoreResult<Vec<ServerDescriptor>>;

    /// Replaces the stored descriptor only if it still has the same
    /// registration identifier.
    ///
    /// Returns whether the update was applied. Registration order is left
    /// unchanged.
    async fn update_if_current(&self, descriptor: &ServerDescriptor) -> DescriptorStoreResult<bool>;

    /// Removes the stored descriptor only if it still has the given
    /// registration identifier.
    ///
    /// Returns whether an entry was removed.
    async fn remove_if_current(
        &self,
        name: &ServerName,
        id: RegistrationId,
    ) -> DescriptorStoreResult<bool>;
}

/// Errors returned by descriptor store implementations.
#[derive(Debug, Clone, Error)]
pub enum DescriptorStoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DescriptorStoreError {
    /// Wraps a persistence-layer failure.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
