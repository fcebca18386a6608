use thiserror::Error;

use crate::address::FuncAddress;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers everything that can go wrong while installing, removing or resolving
/// hooks. Each variant states which operation it belongs to and whether the caller should
/// treat it as fatal.
///
/// # Error Categories
///
/// ## Interception Backend
/// - [`Error::PrimitiveUnavailable`] - Backend failed to load or initialize (fatal)
/// - [`Error::RedirectFailed`] - Backend rejected patching one specific target
///
/// ## Address Resolution
/// - [`Error::ModuleNotFound`] - Module absent from the process module map
/// - [`Error::SignatureNotFound`] - No match for an identifier within the module
///
/// ## Chain Management
/// - [`Error::DuplicateDetour`] - Detour already registered on that target
/// - [`Error::LockError`] - Registry lock poisoned
///
/// # Examples
///
/// ```rust,no_run
/// use layerhook::{Error, FuncAddress, HookRegistry, OriginalCell, Priority};
///
/// # fn demo(registry: &HookRegistry, target: FuncAddress, detour: FuncAddress,
/// #         cell: &'static OriginalCell) {
/// match registry.install(target, detour, cell, Priority::NORMAL) {
///     Ok(()) => println!("hook active"),
///     Err(Error::RedirectFailed { target, reason }) => {
///         eprintln!("cannot patch {target}: {reason}");
///     }
///     Err(Error::DuplicateDetour { target, detour }) => {
///         eprintln!("{detour} is already registered on {target}");
///     }
///     Err(e) => eprintln!("install failed: {e}"),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The interception backend failed to load or initialize.
    ///
    /// Surfaced by the registry constructor when the injected [`Redirector`]
    /// reports that its one-time setup failed. This is fatal to all hooking
    /// for the process lifetime; the registry is never constructed and there
    /// is no retry.
    ///
    /// [`Redirector`]: crate::backend::Redirector
    #[error("Interception backend unavailable - {0}")]
    PrimitiveUnavailable(String),

    /// The interception backend could not patch a specific target.
    ///
    /// Typically means the target's entry bytes use an instruction pattern the
    /// primitive cannot relocate. Local to the failing `install` call: the
    /// target's hook state is left unchanged and other targets are unaffected.
    /// Callers may retry with a different target or proceed without the hook.
    ///
    /// # Fields
    ///
    /// * `target` - The address that could not be patched
    /// * `reason` - Backend-specific description of the failure
    #[error("Redirect of {target} failed - {reason}")]
    RedirectFailed {
        /// The address that could not be patched
        target: FuncAddress,
        /// Backend-specific description of the failure
        reason: String,
    },

    /// The named module is not present in the process module map.
    ///
    /// Expected and non-fatal: the module may simply not be loaded. The lookup
    /// is retried on the next resolution attempt rather than negatively cached.
    #[error("Module '{0}' not found in the process module map")]
    ModuleNotFound(String),

    /// No signature match for an identifier within the module range.
    ///
    /// Expected and non-fatal: byte patterns drift across binary versions.
    /// Callers are expected to operate in a degraded mode (skip the feature
    /// that needed this function) rather than abort.
    #[error("No signature match for identifier '{0}'")]
    SignatureNotFound(String),

    /// The detour address is already registered on the target.
    ///
    /// A chain holds at most one registration per detour address so that
    /// `uninstall(target, detour)` can never face an ambiguous match. The
    /// failing `install` changes nothing.
    ///
    /// # Fields
    ///
    /// * `target` - The target function the chain belongs to
    /// * `detour` - The detour that was registered twice
    #[error("Detour {detour} is already registered on target {target}")]
    DuplicateDetour {
        /// The target function the chain belongs to
        target: FuncAddress,
        /// The detour that was registered twice
        detour: FuncAddress,
    },

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically when the
    /// registry mutex was poisoned by a panic in another thread.
    #[error("Failed to lock target")]
    LockError,

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping
    /// backend-specific failures with additional context.
    #[error("{0}")]
    Error(String),
}
