//! The hook-chain core.
//!
//! This module owns the central data structure of the crate: the per-target
//! chain of hook registrations and the registry that maps target addresses to
//! chains.
//!
//! # Architecture
//!
//! - [`OriginalCell`] - A caller-owned cell the chain writes the "next
//!   function in line" address into. The one piece of consumer-visible
//!   mutable state.
//! - [`Priority`] - The chain ordering key. Lower values run first; equal
//!   values run in registration order.
//! - [`HookRegistry`] - The explicitly-owned service object holding the
//!   target→chain table, one coarse mutex, and the injected
//!   [`Redirector`](crate::backend::Redirector).
//! - [`RegistryConfig`] - Construction-time configuration handed to the
//!   primitive's one-time init.
//!
//! # Chain semantics
//!
//! A chain orders its registrations by `(priority ascending, sequence
//! ascending)`, where the sequence id is assigned at insertion time and is
//! strictly increasing per target. Re-linking walks that order and points
//! each registration's cell at the next registration's detour; the last cell
//! receives the target's true original entry, and the first detour becomes
//! the address the live redirect jumps to. Handlers never learn about chain
//! membership - they call through their cell and the chain rewires it
//! underneath them whenever siblings are added or removed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use layerhook::prelude::*;
//! # fn demo(registry: &HookRegistry, target: FuncAddress, detour: FuncAddress) -> layerhook::Result<()> {
//! static NEXT: OriginalCell = OriginalCell::new();
//!
//! registry.install(target, detour, &NEXT, Priority::HIGH)?;
//! // ... later
//! let removed = registry.uninstall(target, detour)?;
//! assert!(removed);
//! # Ok(())
//! # }
//! ```

mod cell;
mod chain;
mod registry;

pub use cell::OriginalCell;
pub use chain::Priority;
pub use registry::{HookRegistry, RegistryConfig};
