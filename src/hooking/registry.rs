use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    address::FuncAddress,
    backend::{RedirectMode, Redirector},
    hooking::{
        cell::OriginalCell,
        chain::{HookChain, Priority},
    },
    Error::LockError,
    Result,
};

/// Construction-time configuration for the interception primitive.
///
/// Handed to [`Redirector::init`](crate::backend::Redirector::init) exactly
/// once when the registry is built. The defaults are what layered chains
/// need: shared mode, non-debuggable targets.
///
/// # Examples
///
/// ```rust
/// use layerhook::{RedirectMode, RegistryConfig};
///
/// let config = RegistryConfig::default();
/// assert_eq!(config.mode, RedirectMode::Shared);
/// assert!(!config.debuggable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Init mode for the primitive.
    ///
    /// Chains assume [`RedirectMode::Shared`]; under `Unique` the primitive
    /// itself rejects the second install on a target.
    pub mode: RedirectMode,

    /// Whether the primitive should keep hooked targets debuggable
    pub debuggable: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            mode: RedirectMode::Shared,
            debuggable: false,
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration that keeps hooked targets debuggable.
    ///
    /// Useful while developing detours; carries the cost the primitive
    /// attaches to debuggability.
    #[must_use]
    pub fn debuggable() -> Self {
        RegistryConfig {
            debuggable: true,
            ..RegistryConfig::default()
        }
    }
}

/// The process-wide hook table: target address → hook chain.
///
/// One registry instance owns every chain and the injected interception
/// primitive. Construct it once at startup and hand a reference to every
/// component that installs hooks - there is no hidden global instance.
///
/// # Concurrency
///
/// A single mutex guards the whole table and every call into the primitive.
/// Any thread may call any operation at any time; each operation is atomic as
/// observed from outside and holds the lock only for bounded, CPU-only work.
/// The price of the coarse lock is that operations on unrelated targets
/// serialize; the gain is that two threads can never interleave re-links,
/// even across different chains.
///
/// Detour handlers must not call [`install`](HookRegistry::install) or
/// [`uninstall`](HookRegistry::uninstall) for the target whose chain they are
/// currently executing in - the registry lock is not reentrant and the call
/// would deadlock.
///
/// # Examples
///
/// ```rust,no_run
/// use layerhook::prelude::*;
/// # struct Engine;
/// # impl Redirector for Engine {
/// #     fn init(&self, _: RedirectMode, _: bool) -> layerhook::Result<()> { Ok(()) }
/// #     fn redirect(&self, _: FuncAddress, _: FuncAddress) -> layerhook::Result<Redirection> { unimplemented!() }
/// #     fn remove_redirect(&self, _: StubHandle) -> layerhook::Result<()> { Ok(()) }
/// # }
///
/// static NEXT: OriginalCell = OriginalCell::new();
/// # extern "C" fn detour() {}
///
/// # fn main() -> layerhook::Result<()> {
/// let registry = HookRegistry::new(Box::new(Engine))?;
///
/// let target = FuncAddress::new(0x7fff_1234_0000);
/// registry.install(target, FuncAddress::new(detour as usize), &NEXT, Priority::NORMAL)?;
/// assert!(registry.is_hooked(target));
///
/// registry.uninstall(target, FuncAddress::new(detour as usize))?;
/// assert!(!registry.is_hooked(target));
/// # Ok(())
/// # }
/// ```
pub struct HookRegistry {
    /// The injected interception primitive, only ever called under the lock
    backend: Box<dyn Redirector>,
    /// All active chains, keyed by target address
    chains: Mutex<HashMap<FuncAddress, HookChain>>,
}

impl HookRegistry {
    /// Creates a registry over the given primitive with default configuration.
    ///
    /// Initializes the primitive (shared mode, non-debuggable) before
    /// returning, so a successfully constructed registry is ready to install
    /// hooks; there is no lazy first-call setup.
    ///
    /// # Errors
    ///
    /// [`Error::PrimitiveUnavailable`](crate::Error::PrimitiveUnavailable) if
    /// the primitive's one-time init failed. Fatal; hooking is unavailable
    /// for this process.
    pub fn new(backend: Box<dyn Redirector>) -> Result<Self> {
        Self::with_config(backend, RegistryConfig::default())
    }

    /// Creates a registry with explicit primitive configuration.
    ///
    /// # Errors
    ///
    /// Same as [`HookRegistry::new`].
    pub fn with_config(backend: Box<dyn Redirector>, config: RegistryConfig) -> Result<Self> {
        backend.init(config.mode, config.debuggable)?;
        log::debug!(
            "interception backend initialized ({} mode, debuggable: {})",
            config.mode,
            config.debuggable
        );

        Ok(HookRegistry {
            backend,
            chains: Mutex::new(HashMap::new()),
        })
    }

    /// Installs a hook on `target`.
    ///
    /// The first install on a target redirects it via the primitive and
    /// captures the reported previous entry point as the chain's true
    /// original. Later installs insert into the existing chain, re-link it,
    /// and re-point the live redirect at the possibly changed head; the true
    /// original is never touched again.
    ///
    /// After this returns, `slot` holds the address of the next function in
    /// line for this registration and is kept current across all later chain
    /// changes.
    ///
    /// # Arguments
    ///
    /// * `target` - The function address to intercept
    /// * `detour` - The consumer's handler; at most one registration per
    ///   detour address may exist on one target
    /// * `slot` - The consumer-owned cell that receives the "next function"
    ///   address
    /// * `priority` - Execution ordering, lower runs first
    ///
    /// # Errors
    ///
    /// - [`Error::RedirectFailed`](crate::Error::RedirectFailed) - the
    ///   primitive could not patch `target`; the target's hook state is
    ///   unchanged (a partially created chain is discarded, a freshly
    ///   inserted registration is rolled back)
    /// - [`Error::DuplicateDetour`](crate::Error::DuplicateDetour) - `detour`
    ///   is already registered on `target`
    /// - [`Error::LockError`](crate::Error::LockError) - registry lock
    ///   poisoned
    pub fn install(
        &self,
        target: FuncAddress,
        detour: FuncAddress,
        slot: &'static OriginalCell,
        priority: Priority,
    ) -> Result<()> {
        let mut chains = self.chains.lock().map_err(|_| LockError)?;

        log::debug!("installing hook: target {target}, detour {detour}, priority {priority}");

        if let Some(chain) = chains.get_mut(&target) {
            chain.insert(detour, slot, priority)?;
            if let Err(err) = self.backend.redirect(target, chain.head()) {
                chain.remove(detour);
                return Err(err);
            }
            return Ok(());
        }

        // First hook on this target: the redirect's reported previous entry
        // is the true original and is captured for the chain lifetime.
        let redirection = self.backend.redirect(target, detour)?;
        let mut chain = HookChain::new(target, redirection.stub, redirection.previous);
        // cannot collide on an empty chain
        chain.insert(detour, slot, priority)?;
        chains.insert(target, chain);
        Ok(())
    }

    /// Removes the hook registered with `detour` on `target`.
    ///
    /// Returns `Ok(true)` if a registration was removed. A null or unknown
    /// target, or a detour with no registration on it, returns `Ok(false)`
    /// without touching anything.
    ///
    /// Removing the last registration fully removes the primitive's redirect
    /// and evicts the chain; the target is then indistinguishable from one
    /// that was never hooked. Otherwise the chain is re-linked and the live
    /// redirect re-pointed at the new head.
    ///
    /// # Errors
    ///
    /// - [`Error::LockError`](crate::Error::LockError) - registry lock
    ///   poisoned
    /// - Backend errors from re-pointing or removing the redirect. The
    ///   registration is gone either way; the error reports that the live
    ///   redirect could not be brought in line with the chain.
    pub fn uninstall(&self, target: FuncAddress, detour: FuncAddress) -> Result<bool> {
        if target.is_null() {
            return Ok(false);
        }

        let mut chains = self.chains.lock().map_err(|_| LockError)?;

        let Some(chain) = chains.get_mut(&target) else {
            return Ok(false);
        };
        if !chain.remove(detour) {
            return Ok(false);
        }

        log::debug!("uninstalled hook: target {target}, detour {detour}");

        if chain.is_empty() {
            let stub = chain.stub();
            chains.remove(&target);
            self.backend.remove_redirect(stub)?;
        } else {
            let head = chain.head();
            self.backend.redirect(target, head)?;
        }

        Ok(true)
    }

    /// Removes every chain's redirect and clears the table.
    ///
    /// For process or module unload. Individual backend failures are logged
    /// and do not stop the sweep. Not meant to race with concurrent installs;
    /// it takes the same lock, so it is safe, but hooks installed after the
    /// sweep simply start a new table.
    pub fn teardown_all(&self) {
        let Ok(mut chains) = self.chains.lock() else {
            log::warn!("teardown skipped: registry lock poisoned");
            return;
        };

        for (target, chain) in chains.drain() {
            if let Err(err) = self.backend.remove_redirect(chain.stub()) {
                log::warn!("failed to remove redirect for {target}: {err}");
            }
        }
    }

    /// Returns whether `target` currently has at least one hook installed
    #[must_use]
    pub fn is_hooked(&self, target: FuncAddress) -> bool {
        self.chains
            .lock()
            .map(|chains| chains.contains_key(&target))
            .unwrap_or(false)
    }

    /// Returns the number of hooks registered on `target`
    #[must_use]
    pub fn hook_count(&self, target: FuncAddress) -> usize {
        self.chains
            .lock()
            .map(|chains| chains.get(&target).map_or(0, HookChain::len))
            .unwrap_or(0)
    }
}

impl Drop for HookRegistry {
    fn drop(&mut self) {
        // An owned registry must not strand live redirects pointing at
        // detours that are about to become invalid.
        self.teardown_all();
    }
}
