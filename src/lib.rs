//! chained-hashtable: a single-threaded separate-chaining hash table, and
//! the command-driven library simulator that uses it as its only store.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative store whose collision handling, growth and
//!   ownership rules are explicit and testable layer by layer.
//! - Layers:
//!   - BucketList<T>: ordered singly-linked chain; nodes live in a
//!     `SlotMap` arena and link through generational keys. Knows nothing
//!     about hashing.
//!   - ChainedHashTable<K, V, H>: array of BucketLists indexed by
//!     `digest % bucket_count`; owns every key and value; doubles its
//!     bucket array when the load factor is exceeded.
//!   - Library / UserRegistry / Simulator: book, user and banned-user
//!     stores built on the table, driven by a line-oriented command
//!     protocol.
//!
//! Constraints
//! - Single-threaded: no locking, every operation runs to completion.
//! - Keys are immutable once stored; an overwrite keeps the stored key and
//!   replaces only the value.
//! - New keys are prepended to their chain (most recent first).
//! - The table only grows. Growth is synchronous: the `put` that pushes
//!   `len / bucket_count` over the maximum doubles the bucket array before
//!   it returns.
//!
//! Hashing
//! - The shipped hasher is djb2 over the key bytes, accumulated in a
//!   wrapping 32-bit signed integer from the seed 5381. Digests match the
//!   classic C formulation, so bucket placement is reproducible.
//! - Each entry caches its digest. Growth relinks entries by the cached
//!   digest and never calls the hasher again.
//!
//! Ownership
//! - Values release what they own through `Drop`. `put` on an existing key
//!   returns the previous value; `remove` returns the removed one; dropping
//!   the table drops everything. A value that owns a table (a book and its
//!   definitions) tears that table down exactly once, when the value goes.
//! - Values are typed, so an overwrite can never write a value of the
//!   wrong size over the stored one.
//!
//! Notes and non-goals
//! - No concurrent access, no persistence, no shrinking on removal.
//! - Allocation failure follows the global allocator (abort).

pub mod bucket_list;
pub mod chained_hash_table;
mod chained_hash_table_proptest;
pub mod command;
pub mod config;
mod error;
pub mod key_hasher;
pub mod library;
pub mod simulator;
pub mod users;

// Public surface
pub use chained_hash_table::ChainedHashTable;
pub use command::{Command, Tokenizer};
pub use config::TableConfig;
pub use error::{Error, Result};
pub use key_hasher::{djb2, Djb2, KeyHasher};
pub use library::{Book, Definition, Library};
pub use simulator::Simulator;
pub use users::{User, UserRegistry};
