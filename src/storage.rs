//! Pluggable storage backends for the ledger's raw collections.
//!
//! The derivation modules never touch storage: the [`crate::ledger`]
//! facade loads collections through a [`Storage`] (async) or
//! [`BlockingStorage`] (blocking) implementation and hands them over as
//! slices. Both traits are generated from one method list.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

/// Generates a storage trait (async or blocking) with all entity methods.
///
/// `@methods` holds the method list once; `@method` renders each entry in
/// async (`impl Future + Send`) or blocking (`fn`) style.
macro_rules! define_storage {
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods blocking);
        }
    };

    (@methods $mode:ident) => {
        // Read
        define_storage!(@method $mode, investors,
            "Returns all stored investors.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Investor>>);
        define_storage!(@method $mode, categories,
            "Returns all stored categories.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Category>>);
        define_storage!(@method $mode, cards,
            "Returns all stored cards.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Card>>);
        define_storage!(@method $mode, expenses,
            "Returns all stored expenses.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Expense>>);
        define_storage!(@method $mode, contributions,
            "Returns all stored contributions.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            -> Result<Vec<Contribution>>);

        // Upsert
        define_storage!(@method $mode, upsert_investors,
            "Inserts or replaces investors (matched by ID).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Investor>, -> Result<()>);
        define_storage!(@method $mode, upsert_categories,
            "Inserts or replaces categories (matched by ID).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Category>, -> Result<()>);
        define_storage!(@method $mode, upsert_cards,
            "Inserts or replaces cards (matched by ID).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Card>, -> Result<()>);
        define_storage!(@method $mode, upsert_expenses,
            "Inserts or replaces expenses (matched by ID).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Expense>, -> Result<()>);
        define_storage!(@method $mode, upsert_contributions,
            "Inserts or replaces contributions (matched by ID).\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            items: Vec<Contribution>, -> Result<()>);

        // Remove
        define_storage!(@method $mode, remove_investors,
            "Removes investors by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[InvestorId], -> Result<()>);
        define_storage!(@method $mode, remove_categories,
            "Removes categories by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[CategoryId], -> Result<()>);
        define_storage!(@method $mode, remove_cards,
            "Removes cards by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[CardId], -> Result<()>);
        define_storage!(@method $mode, remove_expenses,
            "Removes expenses by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[ExpenseId], -> Result<()>);
        define_storage!(@method $mode, remove_contributions,
            "Removes contributions by their IDs.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            ids: &[ContributionId], -> Result<()>);

        // Clear
        define_storage!(@method $mode, clear,
            "Removes all stored data.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            -> Result<()>);
    };

    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_storage {
    //! Async storage trait definition.

    use crate::error::Result;
    use crate::models::{
        Card, CardId, Category, CategoryId, Contribution, ContributionId, Expense, ExpenseId,
        Investor, InvestorId,
    };

    define_storage! {
        trait_name: Storage,
        trait_doc: "Async storage backend for investors, cards, categories, expenses and contributions.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_storage {
    //! Blocking storage trait definition.

    use crate::error::Result;
    use crate::models::{
        Card, CardId, Category, CategoryId, Contribution, ContributionId, Expense, ExpenseId,
        Investor, InvestorId,
    };

    define_storage! {
        trait_name: BlockingStorage,
        trait_doc: "Blocking storage backend for investors, cards, categories, expenses and contributions.\n\nAll methods take `&self`; implementations use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_storage::Storage;
#[cfg(feature = "blocking")]
pub use blocking_storage::BlockingStorage;
