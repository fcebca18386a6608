use std::fmt;

/// The address of a function inside the current process.
///
/// Targets, detours and resolved entry points are all plain addresses in the
/// process image; this newtype keeps them from mixing with byte counts and
/// handles. A value of zero is the null address and means "no function".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncAddress(pub usize);

impl FuncAddress {
    /// The null address
    pub const NULL: FuncAddress = FuncAddress(0);

    /// Creates a new address from a raw value
    #[must_use]
    pub fn new(value: usize) -> Self {
        FuncAddress(value)
    }

    /// Returns the raw address value
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }

    /// Returns true if this is the null address (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for FuncAddress {
    fn from(value: usize) -> Self {
        FuncAddress(value)
    }
}

impl From<FuncAddress> for usize {
    fn from(addr: FuncAddress) -> Self {
        addr.0
    }
}

impl fmt::Debug for FuncAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuncAddress({:#x})", self.0)
    }
}

impl fmt::Display for FuncAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The `[base, base + size)` span a loaded module occupies in the process.
///
/// Returned by [`ModuleMap::find_module_range`](crate::backend::ModuleMap::find_module_range)
/// and handed to the signature scanner as the search window. Module placement
/// does not change for the process lifetime once loaded, so a range may be
/// cached indefinitely after the first successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRange {
    /// Base address of the module image
    pub base: usize,
    /// Total size of the mapped image in bytes
    pub size: usize,
}

impl ModuleRange {
    /// Creates a new module range
    #[must_use]
    pub fn new(base: usize, size: usize) -> Self {
        ModuleRange { base, size }
    }

    /// Returns the first address past the end of the module
    #[must_use]
    pub fn end(&self) -> usize {
        self.base.saturating_add(self.size)
    }

    /// Returns true if the address falls inside this module
    #[must_use]
    pub fn contains(&self, addr: FuncAddress) -> bool {
        addr.value() >= self.base && addr.value() < self.end()
    }
}

impl fmt::Display for ModuleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}..{:#x}", self.base, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_func_address_new() {
        let addr = FuncAddress::new(0x7fff_0000_1000);
        assert_eq!(addr.value(), 0x7fff_0000_1000);
    }

    #[test]
    fn test_func_address_is_null() {
        assert!(FuncAddress::NULL.is_null());
        assert!(FuncAddress::new(0).is_null());
        assert!(!FuncAddress::new(0x1000).is_null());
    }

    #[test]
    fn test_func_address_from_conversion() {
        let value = 0xdead_beef_usize;
        let addr: FuncAddress = value.into();
        assert_eq!(addr.value(), value);

        let back: usize = addr.into();
        assert_eq!(back, value);
    }

    #[test]
    fn test_func_address_display() {
        let addr = FuncAddress::new(0x1000);
        assert_eq!(format!("{}", addr), "0x1000");
        assert_eq!(format!("{}", FuncAddress::NULL), "0x0");
    }

    #[test]
    fn test_func_address_debug() {
        let addr = FuncAddress::new(0x1000);
        let debug_str = format!("{:?}", addr);
        assert!(debug_str.contains("FuncAddress(0x1000"));
    }

    #[test]
    fn test_func_address_ordering() {
        let a = FuncAddress::new(0x1000);
        let b = FuncAddress::new(0x2000);
        assert!(a < b);
        assert_eq!(a, FuncAddress::new(0x1000));
    }

    #[test]
    fn test_func_address_hash() {
        let mut map = HashMap::new();
        map.insert(FuncAddress::new(0x1000), "a");
        map.insert(FuncAddress::new(0x2000), "b");
        assert_eq!(map.get(&FuncAddress::new(0x1000)), Some(&"a"));
        assert_eq!(map.get(&FuncAddress::new(0x3000)), None);
    }

    #[test]
    fn test_module_range_contains() {
        let range = ModuleRange::new(0x1000, 0x500);
        assert_eq!(range.end(), 0x1500);

        assert!(range.contains(FuncAddress::new(0x1000)));
        assert!(range.contains(FuncAddress::new(0x14ff)));
        assert!(!range.contains(FuncAddress::new(0x1500)));
        assert!(!range.contains(FuncAddress::new(0xfff)));
    }

    #[test]
    fn test_module_range_end_saturates() {
        let range = ModuleRange::new(usize::MAX - 10, 100);
        assert_eq!(range.end(), usize::MAX);
    }

    #[test]
    fn test_module_range_display() {
        let range = ModuleRange::new(0x1000, 0x500);
        assert_eq!(format!("{}", range), "0x1000..0x1500");
    }
}
