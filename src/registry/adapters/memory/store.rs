//! In-memory descriptor store.

use crate::registry::{
    domain::{RegistrationId, ServerDescriptor, ServerKind, ServerName},
    ports::{DescriptorStore, DescriptorStoreError, DescriptorStoreResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory descriptor store.
///
/// Every mutation takes the write lock, so operations on one name are
/// linearizable and `list` always sees a consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDescriptorStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    entries: HashMap<ServerName, StoredEntry>,
    next_sequence: u64,
}

#[derive(Debug)]
struct StoredEntry {
    sequence: u64,
    descriptor: ServerDescriptor,
}

impl InMemoryStoreState {
    fn insert(&mut self, descriptor: ServerDescriptor) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.entries.insert(
            descriptor.name().clone(),
            StoredEntry {
                sequence,
                descriptor,
            },
        );
    }

    fn is_current(&self, name: &ServerName, id: RegistrationId) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.descriptor.id() == id)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> DescriptorStoreError {
    DescriptorStoreError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryDescriptorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DescriptorStore for InMemoryDescriptorStore {
    async fn put(&self, descriptor: &ServerDescriptor) -> DescriptorStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.insert(descriptor.clone());
        Ok(())
    }

    async fn get(&self, name: &ServerName) -> DescriptorStoreResult<Option<ServerDescriptor>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.entries.get(name).map(|entry| entry.descriptor.clone()))
    }

    async fn remove(&self, name: &ServerName) -> DescriptorStoreResult<Option<ServerDescriptor>> {
        let mut state = self.state.write().map_err(poisoned)?;
        Ok(state.entries.remove(name).map(|entry| entry.descriptor))
    }

    async fn list(&self, kind: Option<ServerKind>) -> DescriptorStoreResult<Vec<ServerDescriptor>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut entries: Vec<&StoredEntry> = state
            .entries
            .values()
            .filter(|entry| kind.is_none_or(|wanted| entry.descriptor.kind() == wanted))
            .collect();
        entries.sort_by_key(|entry| entry.sequence);
        Ok(entries
            .into_iter()
            .map(|entry| entry.descriptor.clone())
            .collect())
    }

    async fn update_if_current(&self, descriptor: &ServerDescriptor) -> DescriptorStoreResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        match state.entries.get_mut(descriptor.name()) {
            Some(entry) if entry.descriptor.id() == descriptor.id() => {
                entry.descriptor = descriptor.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_if_current(
        &self,
        name: &ServerName,
        id: RegistrationId,
    ) -> DescriptorStoreResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.is_current(name, id) {
            return Ok(false);
        }
        state.entries.remove(name);
        Ok(true)
    }
}
