//! Function-address resolution.
//!
//! Consumers rarely know the raw address of the function they want to hook.
//! What they have is an identifier - an exported symbol name, or a byte
//! pattern recognizable across builds - and the name of the module it lives
//! in. [`AddressResolver`] turns that into a [`FuncAddress`] by combining two
//! injected collaborators: a [`ModuleMap`] that locates the module's
//! `[base, base + size)` span, and a [`SignatureScanner`] that matches the
//! identifier within it.
//!
//! Module placement is fixed for the process lifetime once loaded, so the
//! range is cached after the first successful lookup; a missing module is
//! retried on every call until it appears.
//!
//! Binary versions drift: the byte pattern that identifies a function in one
//! build may not match the next. [`AddressResolver::resolve_any`] takes an
//! ordered list of known variants and returns the first that matches,
//! without consulting the rest.
//!
//! # Examples
//!
//! ```rust,no_run
//! use layerhook::{AddressResolver, ModuleMap, SignatureScanner};
//! # fn demo(modules: Box<dyn ModuleMap>, scanner: Box<dyn SignatureScanner>) {
//! let resolver = AddressResolver::new(modules, scanner, "libtarget.so");
//!
//! // one identifier
//! if let Ok(addr) = resolver.resolve("_ZN6Target4openEPKci") {
//!     println!("open() lives at {addr}");
//! }
//!
//! // ordered fallbacks across binary versions; failure is non-fatal
//! match resolver.resolve_any(&[
//!     "48 89 5C 24 ?? 48 89 74 24 ?? 57 48 83 EC 20 8B F2",
//!     "40 53 48 83 EC 30 8B DA 48 8B F1",
//! ]) {
//!     Ok(addr) => println!("found a known variant at {addr}"),
//!     Err(_) => println!("no variant matched, feature disabled"),
//! }
//! # }
//! ```

use std::sync::Mutex;

use crate::{
    address::{FuncAddress, ModuleRange},
    backend::{ModuleMap, SignatureScanner},
    Error::{Error as GenericError, LockError},
    Result,
};

/// Resolves textual identifiers to function addresses within one module.
///
/// Bound at construction time to the module that contains the functions of
/// interest. The module's range is looked up lazily and cached on first
/// success; identifier matching is delegated to the injected scanner on
/// every call.
///
/// Resolution failure is expected and non-fatal - see
/// [`Error::ModuleNotFound`](crate::Error::ModuleNotFound) and
/// [`Error::SignatureNotFound`](crate::Error::SignatureNotFound). Callers
/// decide whether to proceed without the function.
pub struct AddressResolver {
    /// Process module-map collaborator
    modules: Box<dyn ModuleMap>,
    /// Identifier matching collaborator
    scanner: Box<dyn SignatureScanner>,
    /// The module all identifiers are resolved against
    module_name: String,
    /// Cached range, set on first successful lookup
    range: Mutex<Option<ModuleRange>>,
}

impl AddressResolver {
    /// Creates a resolver bound to `module_name`.
    ///
    /// No lookup happens yet; the module does not need to be loaded until the
    /// first resolution attempt.
    pub fn new(
        modules: Box<dyn ModuleMap>,
        scanner: Box<dyn SignatureScanner>,
        module_name: impl Into<String>,
    ) -> Self {
        AddressResolver {
            modules,
            scanner,
            module_name: module_name.into(),
            range: Mutex::new(None),
        }
    }

    /// The module this resolver searches in
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The cached module range, if the module has been located already.
    ///
    /// For diagnostics; [`resolve`](AddressResolver::resolve) performs the
    /// lookup on demand.
    #[must_use]
    pub fn module_range(&self) -> Option<ModuleRange> {
        self.range.lock().ok().and_then(|range| *range)
    }

    /// Resolves a single identifier to a function address.
    ///
    /// # Errors
    ///
    /// - [`Error::ModuleNotFound`](crate::Error::ModuleNotFound) - the bound
    ///   module is not loaded; retried on the next call
    /// - [`Error::SignatureNotFound`](crate::Error::SignatureNotFound) - the
    ///   module is loaded but nothing matches the identifier
    /// - [`Error::LockError`](crate::Error::LockError) - range cache lock
    ///   poisoned
    pub fn resolve(&self, identifier: &str) -> Result<FuncAddress> {
        let range = self.locate_module()?;

        match self.scanner.match_signature(range, identifier) {
            Ok(addr) => {
                log::debug!("resolved identifier [{identifier}] to address {addr}");
                Ok(addr)
            }
            Err(err) => {
                log::debug!("failed to resolve identifier [{identifier}]: {err}");
                Err(err)
            }
        }
    }

    /// Resolves the first matching identifier from an ordered candidate list.
    ///
    /// Candidates are tried strictly in order and the first success wins;
    /// later candidates are not consulted. Useful when a function's
    /// recognizable byte pattern differs across binary versions but one of
    /// several known variants will match.
    ///
    /// # Errors
    ///
    /// The error of the last attempted candidate if none matched, or a
    /// generic error for an empty candidate list.
    pub fn resolve_any<I, S>(&self, identifiers: I) -> Result<FuncAddress>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut last_miss = None;
        for identifier in identifiers {
            match self.resolve(identifier.as_ref()) {
                Ok(addr) => return Ok(addr),
                Err(err) => last_miss = Some(err),
            }
        }

        Err(last_miss
            .unwrap_or_else(|| GenericError("empty identifier candidate list".to_string())))
    }

    /// Returns the module range, querying the module map only until the first
    /// success.
    fn locate_module(&self) -> Result<ModuleRange> {
        let mut cached = self.range.lock().map_err(|_| LockError)?;
        if let Some(range) = *cached {
            return Ok(range);
        }

        let range = self.modules.find_module_range(&self.module_name)?;
        log::debug!(
            "module {} located at {} ({:#x} bytes)",
            self.module_name,
            range,
            range.size
        );
        *cached = Some(range);
        Ok(range)
    }
}
