// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # layerhook
//!
//! Priority-ordered, layered function-interception chains over a single low-level
//! redirect primitive.
//!
//! Inline-hooking engines (shadowhook, MinHook and friends) expose one operation:
//! *redirect this address to that address, and tell me where execution used to go*.
//! That is enough for exactly one consumer per target function. `layerhook` builds
//! the missing layer on top: any number of independent consumers can intercept the
//! same target, each with an execution priority, and each still able to call "the
//! next function in line" - which is another consumer's detour or, at the end of
//! the chain, the true original entry point.
//!
//! ## Features
//!
//! - **Layered chains** - Unlimited hooks per target, executed in priority order,
//!   re-linked transparently as siblings come and go
//! - **Deterministic ordering** - Lower priority value runs first; equal priorities
//!   run in registration order
//! - **Oblivious handlers** - A detour only ever calls through its [`OriginalCell`];
//!   chain topology changes never require consumer code changes
//! - **Injected backends** - The interception primitive, module map and signature
//!   scanner are narrow traits supplied at construction time; no hidden globals,
//!   no lazy first-call initialization
//! - **Resilient resolution** - A function address can be resolved from an ordered
//!   list of candidate identifiers, first match wins
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use layerhook::prelude::*;
//! # struct MyShadowhook;
//! # impl Redirector for MyShadowhook {
//! #     fn init(&self, _: RedirectMode, _: bool) -> layerhook::Result<()> { Ok(()) }
//! #     fn redirect(&self, _: FuncAddress, _: FuncAddress) -> layerhook::Result<Redirection> { unimplemented!() }
//! #     fn remove_redirect(&self, _: StubHandle) -> layerhook::Result<()> { Ok(()) }
//! # }
//!
//! static NEXT_OPEN: OriginalCell = OriginalCell::new();
//!
//! extern "C" fn my_open_detour(path: *const u8, flags: i32) -> i32 {
//!     // observe the call, then hand off to the next hook in line
//!     let next: extern "C" fn(*const u8, i32) -> i32 =
//!         unsafe { std::mem::transmute(NEXT_OPEN.get().value()) };
//!     next(path, flags)
//! }
//!
//! # fn main() -> layerhook::Result<()> {
//! let registry = HookRegistry::new(Box::new(MyShadowhook))?;
//!
//! let target = FuncAddress::new(0x7fff_0000_1000);
//! let detour = FuncAddress::new(my_open_detour as usize);
//! registry.install(target, detour, &NEXT_OPEN, Priority::NORMAL)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! `layerhook` is organized into a few small modules:
//!
//! - [`prelude`] - Convenient re-exports of the commonly used types
//! - [`backend`] - The consumed collaborator traits: [`Redirector`],
//!   [`ModuleMap`], [`SignatureScanner`]
//! - [`hooking`] - The chain core: [`HookRegistry`], [`OriginalCell`],
//!   [`Priority`]
//! - [`resolve`] - [`AddressResolver`], symbol/byte-pattern address resolution
//!   with module-range caching
//! - [`Error`] and [`Result`] - Crate-wide error handling
//!
//! ### The chain model
//!
//! Every hooked target owns one chain. Installing a hook inserts a registration
//! keyed by `(priority, sequence)` and re-links the chain: each registration's
//! cell is pointed at the next registration's detour, the last cell at the true
//! original entry, and the target's live redirect at the first detour. Invoking
//! the target therefore visits every handler exactly once, in priority order,
//! and ends at the real function - no matter how often hooks have been added or
//! removed since any individual handler was written.
//!
//! ### Concurrency
//!
//! One registry-wide mutex serializes every install, uninstall and teardown,
//! including the calls into the redirect primitive. Externally observed hook
//! state transitions are atomic, and two threads can never interleave re-links
//! of the same or different chains. Detour handlers must not install or
//! uninstall hooks for the target they are currently executing under - the
//! operation would reacquire the registry lock and deadlock.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result):
//!
//! ```rust,no_run
//! use layerhook::{Error, FuncAddress, HookRegistry, OriginalCell, Priority};
//! # fn demo(registry: &HookRegistry, target: FuncAddress, detour: FuncAddress,
//! #         cell: &'static OriginalCell) {
//! match registry.install(target, detour, cell, Priority::HIGH) {
//!     Ok(()) => {}
//!     Err(Error::RedirectFailed { target, .. }) => {
//!         // this target cannot be patched; proceed without the hook
//!         eprintln!("skipping unhookable target {target}");
//!     }
//!     Err(e) => eprintln!("install failed: {e}"),
//! }
//! # }
//! ```
//!
//! A failed install leaves the target's hook state exactly as it was: no partial
//! chain, no half-linked registrations. A failed resolution yields
//! [`Error::SignatureNotFound`] and callers are expected to degrade gracefully
//! (skip that feature) rather than abort.

pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use layerhook::prelude::*;
///
/// let priority = Priority::NORMAL;
/// let target = FuncAddress::new(0x1000);
/// assert!(!target.is_null());
/// ```
pub mod prelude;

/// Process address primitives.
///
/// Newtype wrappers for the raw addresses this crate shuffles around:
///
/// - [`FuncAddress`] - The address of a function inside the current process
/// - [`ModuleRange`] - The `[base, base + size)` span of a loaded module
pub mod address;

/// Consumed collaborator interfaces.
///
/// The machine-code interception primitive, the process module map and the
/// byte-pattern scanner are external to this crate and consumed through the
/// narrow traits defined here:
///
/// - [`Redirector`] - Install/update/remove a single redirect at an address
/// - [`ModuleMap`] - Look up the base and size of a loaded module by name
/// - [`SignatureScanner`] - Locate a function by identifier within a module range
///
/// Implementations are injected into [`HookRegistry`] and [`AddressResolver`]
/// at construction time.
pub mod backend;

/// The hook-chain core.
///
/// - [`HookRegistry`] - The process-wide target→chain table and its operations
/// - [`OriginalCell`] - The caller-owned "call the next function" cell
/// - [`Priority`] - Chain execution ordering key
/// - [`RegistryConfig`] - Construction-time primitive configuration
pub mod hooking;

/// Function-address resolution.
///
/// [`AddressResolver`] turns a textual identifier - a symbol name or byte
/// pattern - into a [`FuncAddress`], using a cached module-range lookup and an
/// injected [`SignatureScanner`]. An ordered candidate list can be supplied for
/// resilience across binary versions.
pub mod resolve;

/// The generic Error type which covers all errors this library can return
pub use error::Error;

pub use address::{FuncAddress, ModuleRange};
pub use backend::{ModuleMap, RedirectMode, Redirection, Redirector, SignatureScanner, StubHandle};
pub use hooking::{HookRegistry, OriginalCell, Priority, RegistryConfig};
pub use resolve::AddressResolver;

/// `Result<T, Error>` - The result type used by this crate
pub type Result<T> = std::result::Result<T, Error>;
