//! JSON-file-based storage backend.
//!
//! Stores each entity type in a separate JSON file under a configurable
//! directory (default: `$XDG_DATA_HOME/rateio-rs/`).

use core::hash::Hash;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[cfg(feature = "async")]
use core::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::memory::{remove_by_key, upsert_by_key};
use crate::error::{RateioError, Result};
use crate::models::{
    Card, CardId, Category, CategoryId, Contribution, ContributionId, Expense, ExpenseId,
    Investor, InvestorId,
};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "rateio-rs";

/// File name for investors.
const INVESTORS_FILE: &str = "investors.json";
/// File name for categories.
const CATEGORIES_FILE: &str = "categories.json";
/// File name for cards.
const CARDS_FILE: &str = "cards.json";
/// File name for expenses.
const EXPENSES_FILE: &str = "expenses.json";
/// File name for contributions.
const CONTRIBUTIONS_FILE: &str = "contributions.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// Every data file, removed by `clear`.
const DATA_FILES: [&str; 5] = [
    INVESTORS_FILE,
    CATEGORIES_FILE,
    CARDS_FILE,
    EXPENSES_FILE,
    CONTRIBUTIONS_FILE,
];

/// File-backed storage that persists the ledger as JSON files.
///
/// # Concurrency
///
/// An in-process [`Mutex`] serializes access within one process. Across
/// processes an advisory lock on `storage.lock` is taken: shared for
/// reads, exclusive for writes.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock
///   investors.json
///   categories.json
///   cards.json
///   expenses.json
///   contributions.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing all JSON files.
    dir: PathBuf,
    /// Serializes in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a file storage rooted at `dir`, creating the directory and
    /// the lock sentinel if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/rateio-rs/` (typically
    /// `~/.local/share/rateio-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                RateioError::Storage("could not determine platform data directory".into())
            })
    }

    /// Root directory of this storage.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a file inside the storage directory.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Runs `op` under the in-process mutex and a shared file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // The operation's own error wins over an unlock failure.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Runs `op` under the in-process mutex and an exclusive file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads a JSON file. A missing file reads as an empty collection.
    fn read_entities<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => serde_json::from_str(&contents).map_err(RateioError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Writes a JSON file via a temporary file and rename.
    fn write_entities<T: Serialize>(&self, name: &str, items: &[T]) -> Result<()> {
        let path = self.path(name);
        let tmp_path = self.path(&format!("{name}.tmp"));
        let json = serde_json::to_string_pretty(items).map_err(RateioError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Reads an entity file under a shared lock.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        self.with_shared_lock(|| self.read_entities(name))
    }

    /// Merges new items into an entity file by key (insert-or-replace).
    fn upsert_file<T, K>(&self, name: &str, new_items: Vec<T>, key_fn: fn(&T) -> K) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        K: Hash + Eq,
    {
        if new_items.is_empty() {
            return Ok(());
        }
        self.with_exclusive_lock(|| {
            let mut items: Vec<T> = self.read_entities(name)?;
            upsert_by_key(&mut items, new_items, key_fn);
            self.write_entities(name, &items)
        })
    }

    /// Removes items from an entity file by key.
    fn remove_file<T, K>(&self, name: &str, ids: &[K], key_fn: fn(&T) -> K) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        K: Hash + Eq,
    {
        if ids.is_empty() {
            return Ok(());
        }
        self.with_exclusive_lock(|| {
            let mut items: Vec<T> = self.read_entities(name)?;
            remove_by_key(&mut items, ids, key_fn);
            self.write_entities(name, &items)
        })
    }

    /// Deletes every data file. The lock sentinel stays.
    fn clear_all(&self) -> Result<()> {
        self.with_exclusive_lock(|| {
            for name in DATA_FILES {
                match fs::remove_file(self.path(name)) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => return Err(storage_io_error(err)),
                }
            }
            Ok(())
        })
    }
}

/// Wraps an I/O error as a storage error.
fn storage_io_error(err: std::io::Error) -> RateioError {
    RateioError::Storage(Box::new(err))
}

/// Converts a poisoned mutex into a storage error.
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> RateioError {
    RateioError::Storage(err.to_string().into())
}

/// Key extractor for investors.
fn investor_key(item: &Investor) -> InvestorId {
    item.id.clone()
}

/// Key extractor for categories.
fn category_key(item: &Category) -> CategoryId {
    item.id.clone()
}

/// Key extractor for cards.
fn card_key(item: &Card) -> CardId {
    item.id.clone()
}

/// Key extractor for expenses.
fn expense_key(item: &Expense) -> ExpenseId {
    item.id.clone()
}

/// Key extractor for contributions.
fn contribution_key(item: &Contribution) -> ContributionId {
    item.id.clone()
}

#[cfg(feature = "blocking")]
impl super::BlockingStorage for FileStorage {
    #[inline]
    fn investors(&self) -> Result<Vec<Investor>> {
        self.load(INVESTORS_FILE)
    }

    #[inline]
    fn categories(&self) -> Result<Vec<Category>> {
        self.load(CATEGORIES_FILE)
    }

    #[inline]
    fn cards(&self) -> Result<Vec<Card>> {
        self.load(CARDS_FILE)
    }

    #[inline]
    fn expenses(&self) -> Result<Vec<Expense>> {
        self.load(EXPENSES_FILE)
    }

    #[inline]
    fn contributions(&self) -> Result<Vec<Contribution>> {
        self.load(CONTRIBUTIONS_FILE)
    }

    #[inline]
    fn upsert_investors(&self, items: Vec<Investor>) -> Result<()> {
        self.upsert_file(INVESTORS_FILE, items, investor_key)
    }

    #[inline]
    fn upsert_categories(&self, items: Vec<Category>) -> Result<()> {
        self.upsert_file(CATEGORIES_FILE, items, category_key)
    }

    #[inline]
    fn upsert_cards(&self, items: Vec<Card>) -> Result<()> {
        self.upsert_file(CARDS_FILE, items, card_key)
    }

    #[inline]
    fn upsert_expenses(&self, items: Vec<Expense>) -> Result<()> {
        self.upsert_file(EXPENSES_FILE, items, expense_key)
    }

    #[inline]
    fn upsert_contributions(&self, items: Vec<Contribution>) -> Result<()> {
        self.upsert_file(CONTRIBUTIONS_FILE, items, contribution_key)
    }

    #[inline]
    fn remove_investors(&self, ids: &[InvestorId]) -> Result<()> {
        self.remove_file(INVESTORS_FILE, ids, investor_key)
    }

    #[inline]
    fn remove_categories(&self, ids: &[CategoryId]) -> Result<()> {
        self.remove_file(CATEGORIES_FILE, ids, category_key)
    }

    #[inline]
    fn remove_cards(&self, ids: &[CardId]) -> Result<()> {
        self.remove_file(CARDS_FILE, ids, card_key)
    }

    #[inline]
    fn remove_expenses(&self, ids: &[ExpenseId]) -> Result<()> {
        self.remove_file(EXPENSES_FILE, ids, expense_key)
    }

    #[inline]
    fn remove_contributions(&self, ids: &[ContributionId]) -> Result<()> {
        self.remove_file(CONTRIBUTIONS_FILE, ids, contribution_key)
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.clear_all()
    }
}

#[cfg(feature = "async")]
impl super::Storage for FileStorage {
    #[inline]
    fn investors(&self) -> impl Future<Output = Result<Vec<Investor>>> + Send {
        core::future::ready(self.load(INVESTORS_FILE))
    }

    #[inline]
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send {
        core::future::ready(self.load(CATEGORIES_FILE))
    }

    #[inline]
    fn cards(&self) -> impl Future<Output = Result<Vec<Card>>> + Send {
        core::future::ready(self.load(CARDS_FILE))
    }

    #[inline]
    fn expenses(&self) -> impl Future<Output = Result<Vec<Expense>>> + Send {
        core::future::ready(self.load(EXPENSES_FILE))
    }

    #[inline]
    fn contributions(&self) -> impl Future<Output = Result<Vec<Contribution>>> + Send {
        core::future::ready(self.load(CONTRIBUTIONS_FILE))
    }

    #[inline]
    fn upsert_investors(&self, items: Vec<Investor>) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.upsert_file(INVESTORS_FILE, items, investor_key))
    }

    #[inline]
    fn upsert_categories(&self, items: Vec<Category>) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.upsert_file(CATEGORIES_FILE, items, category_key))
    }

    #[inline]
    fn upsert_cards(&self, items: Vec<Card>) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.upsert_file(CARDS_FILE, items, card_key))
    }

    #[inline]
    fn upsert_expenses(&self, items: Vec<Expense>) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.upsert_file(EXPENSES_FILE, items, expense_key))
    }

    #[inline]
    fn upsert_contributions(
        &self,
        items: Vec<Contribution>,
    ) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.upsert_file(CONTRIBUTIONS_FILE, items, contribution_key))
    }

    #[inline]
    fn remove_investors(&self, ids: &[InvestorId]) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_file(INVESTORS_FILE, ids, investor_key))
    }

    #[inline]
    fn remove_categories(&self, ids: &[CategoryId]) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_file(CATEGORIES_FILE, ids, category_key))
    }

    #[inline]
    fn remove_cards(&self, ids: &[CardId]) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_file(CARDS_FILE, ids, card_key))
    }

    #[inline]
    fn remove_expenses(&self, ids: &[ExpenseId]) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_file(EXPENSES_FILE, ids, expense_key))
    }

    #[inline]
    fn remove_contributions(
        &self,
        ids: &[ContributionId],
    ) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.remove_file(CONTRIBUTIONS_FILE, ids, contribution_key))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.clear_all())
    }
}
