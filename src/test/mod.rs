//! Shared fakes for unit tests.
//!
//! The collaborators this crate consumes are narrow traits, so the unit tests
//! drive the real chain and registry logic against small in-memory doubles:
//!
//! - [`FakeRedirector`] - records every primitive call, tracks the live
//!   redirect per target, and can be told to reject specific targets
//! - [`StaticModuleMap`] - a fixed name→range table that records lookups
//! - [`TableScanner`] - a fixed identifier→address table that records queries

use std::collections::{HashMap, HashSet};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use crate::{
    address::{FuncAddress, ModuleRange},
    backend::{ModuleMap, RedirectMode, Redirection, Redirector, SignatureScanner, StubHandle},
    Error, Result,
};

/// The synthetic "true original" entry the fake primitive reports for a
/// target's first redirect. Offset chosen so originals never collide with the
/// detour addresses tests use.
pub(crate) fn original_entry_for(target: FuncAddress) -> FuncAddress {
    FuncAddress::new(target.value() + 0x0100_0000)
}

/// Observable state of a [`FakeRedirector`], shared with the test body.
pub(crate) struct RedirectorState {
    /// Every `init` call with its arguments
    pub init_calls: Mutex<Vec<(RedirectMode, bool)>>,
    /// Every `redirect` call as `(target, entry)`
    pub redirects: Mutex<Vec<(FuncAddress, FuncAddress)>>,
    /// Every stub passed to `remove_redirect`
    pub removed: Mutex<Vec<StubHandle>>,
    /// Live redirects: target → (stub, current entry)
    pub installed: Mutex<HashMap<FuncAddress, (StubHandle, FuncAddress)>>,
    /// Targets `redirect` must reject
    fail_targets: Mutex<HashSet<FuncAddress>>,
    /// Whether `init` must fail
    fail_init: bool,
    /// Stub handle source
    next_stub: AtomicUsize,
}

impl RedirectorState {
    /// The entry the target currently redirects to, if hooked
    pub fn current_entry(&self, target: FuncAddress) -> Option<FuncAddress> {
        self.installed
            .lock()
            .unwrap()
            .get(&target)
            .map(|(_, entry)| *entry)
    }

    /// Makes every later `redirect` call on `target` fail
    pub fn fail_target(&self, target: FuncAddress) {
        self.fail_targets.lock().unwrap().insert(target);
    }
}

/// An in-memory interception primitive.
pub(crate) struct FakeRedirector {
    state: Arc<RedirectorState>,
}

impl FakeRedirector {
    /// Creates a fake whose state the test can observe
    pub fn new() -> (Self, Arc<RedirectorState>) {
        Self::build(false)
    }

    /// Creates a fake whose `init` fails
    pub fn failing_init() -> (Self, Arc<RedirectorState>) {
        Self::build(true)
    }

    fn build(fail_init: bool) -> (Self, Arc<RedirectorState>) {
        let state = Arc::new(RedirectorState {
            init_calls: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            installed: Mutex::new(HashMap::new()),
            fail_targets: Mutex::new(HashSet::new()),
            fail_init,
            next_stub: AtomicUsize::new(1),
        });
        (
            FakeRedirector {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl Redirector for FakeRedirector {
    fn init(&self, mode: RedirectMode, debuggable: bool) -> Result<()> {
        self.state.init_calls.lock().unwrap().push((mode, debuggable));
        if self.state.fail_init {
            return Err(Error::PrimitiveUnavailable(
                "fake backend configured to fail".to_string(),
            ));
        }
        Ok(())
    }

    fn redirect(&self, target: FuncAddress, entry: FuncAddress) -> Result<Redirection> {
        if self.state.fail_targets.lock().unwrap().contains(&target) {
            return Err(Error::RedirectFailed {
                target,
                reason: "unsupported instruction pattern".to_string(),
            });
        }

        self.state.redirects.lock().unwrap().push((target, entry));

        let mut installed = self.state.installed.lock().unwrap();
        match installed.get_mut(&target) {
            Some((stub, current)) => {
                // update: report the entry that was live before
                let previous = *current;
                *current = entry;
                Ok(Redirection {
                    stub: *stub,
                    previous,
                })
            }
            None => {
                let stub = StubHandle::new(self.state.next_stub.fetch_add(1, Ordering::Relaxed));
                installed.insert(target, (stub, entry));
                Ok(Redirection {
                    stub,
                    previous: original_entry_for(target),
                })
            }
        }
    }

    fn remove_redirect(&self, stub: StubHandle) -> Result<()> {
        self.state.removed.lock().unwrap().push(stub);

        let mut installed = self.state.installed.lock().unwrap();
        let target = installed
            .iter()
            .find(|(_, (installed_stub, _))| *installed_stub == stub)
            .map(|(target, _)| *target);

        match target {
            Some(target) => {
                installed.remove(&target);
                Ok(())
            }
            None => Err(Error::Error(format!("unknown stub {stub:?}"))),
        }
    }
}

/// A fixed name→range module map that records every lookup.
pub(crate) struct StaticModuleMap {
    ranges: HashMap<String, ModuleRange>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StaticModuleMap {
    /// A map with no modules loaded
    pub fn empty() -> Self {
        StaticModuleMap {
            ranges: HashMap::new(),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A map with a single module
    pub fn with_module(name: &str, range: ModuleRange) -> Self {
        let mut map = Self::empty();
        map.ranges.insert(name.to_string(), range);
        map
    }

    /// The names looked up so far, shared with the test body
    pub fn lookups(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lookups)
    }
}

impl ModuleMap for StaticModuleMap {
    fn find_module_range(&self, name: &str) -> Result<ModuleRange> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.ranges
            .get(name)
            .copied()
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))
    }
}

/// A fixed identifier→address table that records every query.
pub(crate) struct TableScanner {
    table: HashMap<String, FuncAddress>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl TableScanner {
    /// A scanner resolving exactly the given identifiers
    pub fn with_entries(entries: &[(&str, usize)]) -> Self {
        TableScanner {
            table: entries
                .iter()
                .map(|(identifier, addr)| (identifier.to_string(), FuncAddress::new(*addr)))
                .collect(),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The identifiers queried so far, shared with the test body
    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queries)
    }
}

impl SignatureScanner for TableScanner {
    fn match_signature(&self, range: ModuleRange, identifier: &str) -> Result<FuncAddress> {
        self.queries.lock().unwrap().push(identifier.to_string());
        match self.table.get(identifier) {
            Some(addr) if range.contains(*addr) => Ok(*addr),
            _ => Err(Error::SignatureNotFound(identifier.to_string())),
        }
    }
}
