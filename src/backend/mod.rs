//! Consumed collaborator interfaces.
//!
//! This crate deliberately does not patch machine code, read the process
//! module map or scan for byte patterns itself. Those three concerns live
//! behind the narrow traits in this module and are injected at construction
//! time - [`Redirector`] into [`HookRegistry`](crate::hooking::HookRegistry),
//! [`ModuleMap`] and [`SignatureScanner`] into
//! [`AddressResolver`](crate::resolve::AddressResolver).
//!
//! # Contract
//!
//! The [`Redirector`] models the single operation real inline-hook engines
//! provide: redirect one address to another and report where execution used
//! to go. The registry layers priority-ordered chains on top of it and only
//! ever calls it while holding the registry lock, so implementations do not
//! need their own cross-target synchronization.
//!
//! # Examples
//!
//! A redirector adapter over an FFI hooking engine:
//!
//! ```rust,no_run
//! use layerhook::{FuncAddress, RedirectMode, Redirection, Redirector, StubHandle};
//!
//! struct ShadowhookAdapter;
//!
//! impl Redirector for ShadowhookAdapter {
//!     fn init(&self, mode: RedirectMode, debuggable: bool) -> layerhook::Result<()> {
//!         // call the engine's one-time init here
//!         # let _ = (mode, debuggable);
//!         Ok(())
//!     }
//!
//!     fn redirect(
//!         &self,
//!         target: FuncAddress,
//!         entry: FuncAddress,
//!     ) -> layerhook::Result<Redirection> {
//!         // patch `target` to jump to `entry`, report the previous entry point
//!         # let _ = (target, entry);
//!         # unimplemented!()
//!     }
//!
//!     fn remove_redirect(&self, stub: StubHandle) -> layerhook::Result<()> {
//!         // fully restore the target this stub belongs to
//!         # let _ = stub;
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt;

use crate::{
    address::{FuncAddress, ModuleRange},
    Result,
};

/// How the interception primitive treats repeated hooks on one target.
///
/// Chains require [`RedirectMode::Shared`]: the registry re-points the same
/// target's redirect every time the chain head changes. Under
/// [`RedirectMode::Unique`] the primitive itself rejects a second hook on a
/// target, which defeats layering and is only accepted for completeness of
/// the init surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectMode {
    /// A target may be redirected multiple times; later calls update the redirect
    Shared,
    /// A target may be redirected at most once; later calls report an error
    Unique,
}

impl fmt::Display for RedirectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectMode::Shared => write!(f, "shared"),
            RedirectMode::Unique => write!(f, "unique"),
        }
    }
}

/// Opaque handle to one installed redirect.
///
/// Returned by [`Redirector::redirect`] and required by
/// [`Redirector::remove_redirect`] to fully restore the target. The value
/// carries no meaning outside the issuing backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubHandle(pub usize);

impl StubHandle {
    /// Creates a handle from a raw backend value
    #[must_use]
    pub fn new(value: usize) -> Self {
        StubHandle(value)
    }

    /// Returns the raw backend value
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for StubHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StubHandle({:#x})", self.0)
    }
}

/// The result of installing or updating a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirection {
    /// Handle needed to fully remove the redirect later
    pub stub: StubHandle,
    /// The address execution would have reached absent the redirect.
    ///
    /// On the first redirect of a target this is the true original entry
    /// point. On updates it is whatever entry was installed before and is
    /// only useful for bookkeeping.
    pub previous: FuncAddress,
}

/// A machine-code interception primitive.
///
/// The one external capability the hook registry builds on: redirect a target
/// address to a new entry and report the previous one. Implementations adapt
/// a concrete engine (shadowhook, MinHook, a test double) to this surface.
///
/// All methods are called with the registry lock held, never concurrently.
pub trait Redirector: Send + Sync {
    /// One-time setup of the underlying engine.
    ///
    /// Called exactly once, by the registry constructor, before any
    /// [`redirect`](Redirector::redirect) call.
    ///
    /// # Arguments
    ///
    /// * `mode` - Whether one target may be hooked by multiple consumers
    /// * `debuggable` - Whether the engine should keep targets debuggable
    ///
    /// # Errors
    ///
    /// [`Error::PrimitiveUnavailable`](crate::Error::PrimitiveUnavailable) if
    /// the engine could not be loaded or initialized. The failure is fatal to
    /// all hooking; the registry will not be constructed.
    fn init(&self, mode: RedirectMode, debuggable: bool) -> Result<()>;

    /// Installs or updates the redirect at `target` to jump to `entry`.
    ///
    /// When `target` is not currently redirected, this installs a fresh
    /// redirect and the returned [`Redirection::previous`] is the target's
    /// true original entry point. When a redirect already exists (shared
    /// mode), the redirect is re-pointed and `previous` reports the entry
    /// that was installed before.
    ///
    /// # Arguments
    ///
    /// * `target` - The function address to patch
    /// * `entry` - The address execution should be diverted to
    ///
    /// # Errors
    ///
    /// [`Error::RedirectFailed`](crate::Error::RedirectFailed) if the target
    /// cannot be patched, e.g. because its entry bytes cannot be relocated.
    fn redirect(&self, target: FuncAddress, entry: FuncAddress) -> Result<Redirection>;

    /// Fully removes a redirect, restoring the target's original entry.
    ///
    /// # Arguments
    ///
    /// * `stub` - The handle returned when the redirect was first installed
    ///
    /// # Errors
    ///
    /// Backend-specific errors if the stub is unknown or the restore failed.
    fn remove_redirect(&self, stub: StubHandle) -> Result<()>;
}

/// Read access to the process's own loaded-module map.
///
/// Implementations typically parse `/proc/self/maps` or walk the platform
/// loader structures. Results for a given name are stable for the process
/// lifetime once the module is loaded, which is what allows
/// [`AddressResolver`](crate::resolve::AddressResolver) to cache them.
pub trait ModuleMap: Send + Sync {
    /// Looks up the base address and total mapped size of a module by name.
    ///
    /// # Arguments
    ///
    /// * `name` - Module name to search for, e.g. `"libtarget.so"`
    ///
    /// # Errors
    ///
    /// [`Error::ModuleNotFound`](crate::Error::ModuleNotFound) if no mapping
    /// matches the name. Non-fatal; the module may be loaded later.
    fn find_module_range(&self, name: &str) -> Result<ModuleRange>;
}

/// A byte-pattern / symbol matching engine.
///
/// Turns a textual identifier - a mangled symbol name or a signature pattern -
/// into a concrete address within one module's range.
pub trait SignatureScanner: Send + Sync {
    /// Locates a function by identifier within a module's address range.
    ///
    /// # Arguments
    ///
    /// * `range` - The module span to search
    /// * `identifier` - Symbol name or byte-pattern identifier
    ///
    /// # Errors
    ///
    /// [`Error::SignatureNotFound`](crate::Error::SignatureNotFound) if the
    /// identifier matches nothing within the range. Non-fatal; callers fall
    /// back to other candidates or degrade.
    fn match_signature(&self, range: ModuleRange, identifier: &str) -> Result<FuncAddress>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_mode_display() {
        assert_eq!(format!("{}", RedirectMode::Shared), "shared");
        assert_eq!(format!("{}", RedirectMode::Unique), "unique");
    }

    #[test]
    fn test_stub_handle_value() {
        let stub = StubHandle::new(0x42);
        assert_eq!(stub.value(), 0x42);
        assert_eq!(stub, StubHandle(0x42));
    }

    #[test]
    fn test_stub_handle_debug() {
        let stub = StubHandle::new(0x42);
        assert_eq!(format!("{:?}", stub), "StubHandle(0x42)");
    }
}
