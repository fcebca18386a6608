use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::address::FuncAddress;

/// A caller-owned cell holding the address of "the next function in line".
///
/// Every hook registration supplies one of these. After each chain re-link the
/// cell contains the detour of the registration that follows it in priority
/// order - or the target's true original entry point if the registration is
/// last - so a detour handler calls onward without knowing anything about the
/// chain topology:
///
/// ```rust,no_run
/// use layerhook::OriginalCell;
///
/// static NEXT: OriginalCell = OriginalCell::new();
///
/// extern "C" fn my_detour(arg: u64) -> u64 {
///     let next: extern "C" fn(u64) -> u64 =
///         unsafe { std::mem::transmute(NEXT.get().value()) };
///     next(arg)
/// }
/// ```
///
/// # Write-visibility contract
///
/// The chain writes this cell only during re-linking, which always happens
/// under the registry lock. A detour handler reads it at call time without
/// taking that lock, so reads race with concurrent installs and uninstalls on
/// the same target. The guarantee is exactly this: every read observes a
/// complete pointer-width value that was current at some point - either the
/// next hook before the concurrent re-link or the next hook after it, never a
/// torn mix. No stronger synchronization with the consumer's read is provided.
///
/// The cell starts out null and becomes meaningful once its registration has
/// been installed.
pub struct OriginalCell(AtomicUsize);

impl OriginalCell {
    /// Creates an empty cell.
    ///
    /// `const`, so cells can live in statics next to the detour that reads them.
    #[must_use]
    pub const fn new() -> Self {
        OriginalCell(AtomicUsize::new(0))
    }

    /// Reads the current "next function" address.
    ///
    /// Returns the null address until the owning registration has been
    /// installed. See the type-level docs for the contract on reads that race
    /// with chain re-links.
    #[must_use]
    pub fn get(&self) -> FuncAddress {
        FuncAddress::new(self.0.load(Ordering::Acquire))
    }

    /// Rewires the cell to a new next-function address.
    ///
    /// Only the chain calls this, and only under the registry lock.
    pub(crate) fn set(&self, addr: FuncAddress) {
        self.0.store(addr.value(), Ordering::Release);
    }
}

impl Default for OriginalCell {
    fn default() -> Self {
        OriginalCell::new()
    }
}

impl fmt::Debug for OriginalCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OriginalCell({})", self.get())
    }
}
