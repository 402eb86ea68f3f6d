use std::{cell::Cell, path::Path};

use super::storage::{self, LoadError, SaveError};
use serde::{Deserialize, Serialize};

/// A preference value backed by one key of the preferences file.
///
/// The stored value is read on first access; until then, and whenever
/// reading fails, the default is used.
pub struct SavedCell<'a, T>
where
    T: Serialize + for<'d> Deserialize<'d>,
{
    key: &'a str,
    path: Option<&'a Path>,
    cell: Cell<T>,
    uninit: Cell<bool>,
}

impl<'a, T> SavedCell<'a, T>
where
    T: Serialize + for<'d> Deserialize<'d> + PartialEq,
{
    /// A cell stored in the platform preferences file.
    pub const fn new(key: &'a str, default: T) -> Self {
        Self {
            key,
            path: None,
            cell: Cell::new(default),
            uninit: Cell::new(true),
        }
    }

    /// A cell stored in the file at `path`.
    pub const fn at(key: &'a str, default: T, path: &'a Path) -> Self {
        Self {
            key,
            path: Some(path),
            cell: Cell::new(default),
            uninit: Cell::new(true),
        }
    }
}

impl<'a, T> SavedCell<'a, T>
where
    T: Serialize + for<'d> Deserialize<'d> + Copy + PartialEq,
{
    pub fn get(&self) -> T {
        if self.uninit.get() {
            self.uninit.set(false);
            if let Err(e) = self.load() {
                log::debug!("preference `{}` not loaded, using default: {e}", self.key);
            }
        }

        self.cell.get()
    }

    /// Updates the value, writing it out only if it changed.
    pub fn set(&self, value: T) -> Result<(), SaveError> {
        let old = self.get();
        if old == value {
            return Ok(());
        }
        self.cell.set(value);
        self.save()
    }

    pub fn save(&self) -> Result<(), SaveError> {
        storage::save(self.path, self.key, self.cell.get())
    }

    pub fn load(&self) -> Result<T, LoadError> {
        let res = storage::load(self.path, self.key)?;
        self.uninit.set(false);
        self.cell.set(res);
        Ok(res)
    }
}
