use std::collections::BTreeMap;
use std::fmt;

use crate::{
    address::FuncAddress,
    backend::StubHandle,
    hooking::cell::OriginalCell,
    Error::DuplicateDetour,
    Result,
};

/// Execution ordering key for hooks sharing one target.
///
/// Lower values run earlier in the chain. Hooks registered with equal
/// priority run in registration order (first registered, first run). The
/// named levels match the scale consumers usually want; any `i32` works.
///
/// # Examples
///
/// ```rust
/// use layerhook::Priority;
///
/// assert!(Priority::HIGHEST < Priority::NORMAL);
/// assert_eq!(Priority::default(), Priority::NORMAL);
/// let custom = Priority(150);
/// assert!(Priority::HIGH < custom && custom < Priority::NORMAL);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Runs before every other level
    pub const HIGHEST: Priority = Priority(0);
    /// Runs before [`Priority::NORMAL`]
    pub const HIGH: Priority = Priority(100);
    /// The default level
    pub const NORMAL: Priority = Priority(200);
    /// Runs after [`Priority::NORMAL`]
    pub const LOW: Priority = Priority(300);
    /// Runs after every other level
    pub const LOWEST: Priority = Priority(400);

    /// Returns the raw ordering value
    #[must_use]
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::NORMAL
    }
}

impl fmt::Debug for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chain position of one registration.
///
/// Derived ordering compares `priority` first and `sequence` second, which is
/// exactly the chain execution order: lower priority value runs first, ties
/// run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ChainKey {
    priority: Priority,
    sequence: u64,
}

/// One consumer's request to intercept a target.
#[derive(Debug)]
pub(crate) struct HookRegistration {
    /// The consumer's handler address
    pub(crate) detour: FuncAddress,
    /// The consumer-owned cell that receives the "next function" address
    pub(crate) slot: &'static OriginalCell,
    /// Ordering key, lower runs first
    pub(crate) priority: Priority,
    /// Tie-break id, unique within the chain, increasing in insertion order
    pub(crate) sequence: u64,
}

/// All registrations for one target function, in execution order.
///
/// The chain owns the registrations and the bookkeeping the registry needs to
/// talk to the interception primitive: the stub handle from the first
/// redirect and the true original entry point captured from it. It never
/// calls the primitive itself; the registry does that after asking the chain
/// for its current head.
pub(crate) struct HookChain {
    /// The function address being intercepted
    target: FuncAddress,
    /// The pre-hook entry point, captured on first install, never overwritten
    true_original: FuncAddress,
    /// The entry the live redirect should jump to
    head: FuncAddress,
    /// Handle needed to fully remove the redirect
    stub: StubHandle,
    /// Source of sequence ids, increasing over the chain lifetime
    next_sequence: u64,
    /// Registrations in `(priority, sequence)` order
    hooks: BTreeMap<ChainKey, HookRegistration>,
}

impl HookChain {
    /// Creates a chain for `target` from the result of its first redirect.
    pub(crate) fn new(target: FuncAddress, stub: StubHandle, true_original: FuncAddress) -> Self {
        HookChain {
            target,
            true_original,
            head: true_original,
            stub,
            next_sequence: 0,
            hooks: BTreeMap::new(),
        }
    }

    /// Inserts a registration and re-links the chain.
    ///
    /// # Errors
    ///
    /// [`DuplicateDetour`] if `detour` is already registered on this target;
    /// the chain is left untouched.
    pub(crate) fn insert(
        &mut self,
        detour: FuncAddress,
        slot: &'static OriginalCell,
        priority: Priority,
    ) -> Result<()> {
        if self.hooks.values().any(|reg| reg.detour == detour) {
            return Err(DuplicateDetour {
                target: self.target,
                detour,
            });
        }

        self.next_sequence += 1;
        let key = ChainKey {
            priority,
            sequence: self.next_sequence,
        };
        self.hooks.insert(
            key,
            HookRegistration {
                detour,
                slot,
                priority,
                sequence: self.next_sequence,
            },
        );
        self.relink();
        Ok(())
    }

    /// Removes the registration matching `detour` and re-links the chain.
    ///
    /// Returns whether a registration was removed.
    pub(crate) fn remove(&mut self, detour: FuncAddress) -> bool {
        let key = self
            .hooks
            .iter()
            .find(|(_, reg)| reg.detour == detour)
            .map(|(key, _)| *key);

        match key {
            Some(key) => {
                self.hooks.remove(&key);
                self.relink();
                true
            }
            None => false,
        }
    }

    /// Rewires the call sequence after a membership change.
    ///
    /// Walks the registrations in `(priority, sequence)` order: each cell
    /// receives the detour of the following registration, the last cell
    /// receives the true original, and the first detour becomes the head. An
    /// empty chain collapses the head back to the true original.
    fn relink(&mut self) {
        let mut previous: Option<&'static OriginalCell> = None;
        for reg in self.hooks.values() {
            match previous {
                None => self.head = reg.detour,
                Some(slot) => slot.set(reg.detour),
            }
            previous = Some(reg.slot);
        }

        match previous {
            Some(slot) => slot.set(self.true_original),
            None => self.head = self.true_original,
        }
    }

    /// The entry the live redirect should currently jump to
    pub(crate) fn head(&self) -> FuncAddress {
        self.head
    }

    /// The pre-hook entry point of the target
    pub(crate) fn true_original(&self) -> FuncAddress {
        self.true_original
    }

    /// The handle that fully removes this target's redirect
    pub(crate) fn stub(&self) -> StubHandle {
        self.stub
    }

    /// Number of active registrations
    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    /// True once the last registration has been removed
    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Registrations in execution order, for diagnostics and tests
    pub(crate) fn registrations(&self) -> impl Iterator<Item = &HookRegistration> {
        self.hooks.values()
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("target", &self.target)
            .field("true_original", &self.true_original)
            .field("head", &self.head)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
