//! Core contracts for kvlens
//!
//! This crate defines the pieces the rest of the workspace is written
//! against and nothing else:
//!
//! - [`Error`] / [`Result`]: the error taxonomy shared by views and store
//!   backends
//! - the store command contract ([`HashCommands`], [`ListCommands`],
//!   [`SortedSetCommands`], [`KeyCommands`]): the named commands a
//!   connected store handle must provide
//!
//! No I/O happens here. Backends (remote clients, or the in-process
//! [`MemoryStore`]) implement the command traits; the view crate consumes
//! them.
//!
//! [`MemoryStore`]: ../kvlens_store/struct.MemoryStore.html

pub mod commands;
pub mod error;

pub use commands::{HashCommands, KeyCommands, ListCommands, SortedSetCommands, StoreCommands};
pub use error::{Error, Result};
