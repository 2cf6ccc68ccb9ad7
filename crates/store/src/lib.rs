//! In-process store backend for kvlens
//!
//! [`MemoryStore`] implements the full command contract from
//! `kvlens-core` over a lock-guarded in-memory table. It exists so the
//! view layer can be exercised without a remote store: every test in the
//! workspace runs against it, and it works as a local backend wherever
//! view semantics are wanted in-process.

pub mod memory;

pub use memory::MemoryStore;
