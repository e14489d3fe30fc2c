//! Sheet storage behind a trait so callers can swap the in-memory map for a
//! real backend, or for a fake in tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use itertools::Itertools;

use crate::errors::{FormulaError, Result};
use crate::sheet::Sheet;

/// Key → sheet storage.
pub trait SheetStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<Sheet>>;
    /// Insert or replace; returns the previous sheet under that id.
    fn set(&self, sheet: Sheet) -> Result<Option<Sheet>>;
    /// All sheets, ordered by id.
    fn list(&self) -> Result<Vec<Sheet>>;
    fn delete(&self, id: &str) -> Result<Option<Sheet>>;
}

/// Process-local store. Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemorySheetStore {
    inner: Arc<RwLock<HashMap<String, Sheet>>>,
}

impl InMemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheets(sheets: impl IntoIterator<Item = Sheet>) -> Self {
        let map = sheets.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self { inner: Arc::new(RwLock::new(map)) }
    }
}

fn poisoned<T>(_: T) -> FormulaError {
    FormulaError::Store("lock poisoned".into())
}

impl SheetStore for InMemorySheetStore {
    fn get(&self, id: &str) -> Result<Option<Sheet>> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn set(&self, sheet: Sheet) -> Result<Option<Sheet>> {
        let mut map = self.inner.write().map_err(poisoned)?;
        tracing::debug!(id = %sheet.id, "storing sheet");
        Ok(map.insert(sheet.id.clone(), sheet))
    }

    fn list(&self) -> Result<Vec<Sheet>> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.values().cloned().sorted_by(|a, b| a.id.cmp(&b.id)).collect())
    }

    fn delete(&self, id: &str) -> Result<Option<Sheet>> {
        let mut map = self.inner.write().map_err(poisoned)?;
        Ok(map.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(id: &str) -> Sheet {
        Sheet { id: id.into(), name: format!("Sheet {id}"), ..Default::default() }
    }

    #[test]
    fn crud() {
        let store = InMemorySheetStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.set(sheet("b")).unwrap(), None);
        assert_eq!(store.set(sheet("a")).unwrap(), None);

        let mut renamed = sheet("a");
        renamed.name = "Renamed".into();
        assert_eq!(store.set(renamed.clone()).unwrap(), Some(sheet("a")));
        assert_eq!(store.get("a").unwrap(), Some(renamed.clone()));

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert_eq!(store.delete("a").unwrap(), Some(renamed));
        assert_eq!(store.delete("a").unwrap(), None);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = InMemorySheetStore::with_sheets([sheet("x")]);
        let other = store.clone();
        other.delete("x").unwrap();
        assert_eq!(store.get("x").unwrap(), None);
    }

    #[test]
    fn usable_as_trait_object() {
        let store: Box<dyn SheetStore> = Box::new(InMemorySheetStore::new());
        store.set(sheet("z")).unwrap();
        assert!(store.get("z").unwrap().is_some());
    }
}
