// ── Persistence collaborator ──
//
// View-owned state that outlives a session (the operator profile) goes
// through an injected `Persistence` implementation rather than ambient
// global storage. The owner loads once on mount and saves on every
// committed change.

use std::sync::{Mutex, PoisonError};

use crate::error::CoreError;
use crate::model::{OperatorProfile, ProfileField};

/// Load/save backend for one value.
pub trait Persistence<T>: Send + Sync {
    /// Read the stored value. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<T>, CoreError>;

    fn save(&self, value: &T) -> Result<(), CoreError>;
}

/// In-memory backend, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    slot: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn with_value(value: T) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
        }
    }
}

impl<T: Clone + Send> Persistence<T> for MemoryStore<T> {
    fn load(&self) -> Result<Option<T>, CoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, value: &T) -> Result<(), CoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.clone());
        Ok(())
    }
}

// ── Persisted ────────────────────────────────────────────────────────

/// A value loaded from a [`Persistence`] backend on mount and written
/// back on every commit.
pub struct Persisted<T, P> {
    store: P,
    value: T,
}

impl<T, P> Persisted<T, P>
where
    T: Clone + Default,
    P: Persistence<T>,
{
    /// Load the stored value, or start from `T::default()`.
    pub fn mount(store: P) -> Result<Self, CoreError> {
        let value = store.load()?.unwrap_or_default();
        Ok(Self { store, value })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Apply `edit` to a copy and save it. The in-memory value only
    /// changes once the save has succeeded.
    pub fn commit(&mut self, edit: impl FnOnce(&mut T)) -> Result<&T, CoreError> {
        let mut next = self.value.clone();
        edit(&mut next);
        self.store.save(&next)?;
        self.value = next;
        tracing::debug!("persisted value committed");
        Ok(&self.value)
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}

/// Profile page state backed by a persistence collaborator.
pub type ProfileEditor<P> = Persisted<OperatorProfile, P>;

impl<P: Persistence<OperatorProfile>> Persisted<OperatorProfile, P> {
    /// Commit a single field change.
    pub fn set_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<&OperatorProfile, CoreError> {
        let value = value.into();
        self.commit(|profile| profile.set(field, value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FailingStore;

    impl Persistence<OperatorProfile> for FailingStore {
        fn load(&self) -> Result<Option<OperatorProfile>, CoreError> {
            Ok(None)
        }

        fn save(&self, _value: &OperatorProfile) -> Result<(), CoreError> {
            Err(CoreError::Persistence {
                message: "disk full".into(),
            })
        }
    }

    #[test]
    fn mount_loads_existing_value() {
        let stored = OperatorProfile {
            name: "Operator".into(),
            ..OperatorProfile::default()
        };
        let editor = ProfileEditor::mount(MemoryStore::with_value(stored.clone())).unwrap();
        assert_eq!(editor.get(), &stored);
    }

    #[test]
    fn mount_defaults_when_empty() {
        let editor = ProfileEditor::mount(MemoryStore::new()).unwrap();
        assert_eq!(editor.get(), &OperatorProfile::default());
    }

    #[test]
    fn every_commit_is_saved() {
        let mut editor = ProfileEditor::mount(MemoryStore::new()).unwrap();
        editor.set_field(ProfileField::Name, "Ada").unwrap();
        editor.set_field(ProfileField::StudentId, "B21").unwrap();

        let saved = editor.store().load().unwrap().unwrap();
        assert_eq!(saved.name, "Ada");
        assert_eq!(saved.student_id, "B21");
    }

    #[test]
    fn failed_save_leaves_value_untouched() {
        let mut editor = ProfileEditor::mount(FailingStore).unwrap();
        let err = editor.set_field(ProfileField::Name, "Ada").unwrap_err();
        assert!(matches!(err, CoreError::Persistence { .. }));
        assert_eq!(editor.get().name, "");
    }
}
