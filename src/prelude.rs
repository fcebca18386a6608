//! # layerhook Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the layerhook library. Import this module to get quick
//! access to everything needed to install hooks and resolve targets.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all layerhook operations
pub use crate::Error;

/// The result type used throughout layerhook
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The process-wide hook table and its operations
pub use crate::hooking::{HookRegistry, RegistryConfig};

/// Function-address resolution from identifiers
pub use crate::resolve::AddressResolver;

// ================================================================================================
// Chain Building Blocks
// ================================================================================================

/// The caller-owned "call the next function" cell
pub use crate::hooking::OriginalCell;

/// Chain execution ordering key
pub use crate::hooking::Priority;

/// Address primitives
pub use crate::address::{FuncAddress, ModuleRange};

// ================================================================================================
// Collaborator Interfaces
// ================================================================================================

/// The interception primitive trait and its associated types
pub use crate::backend::{RedirectMode, Redirection, Redirector, StubHandle};

/// Module lookup and signature matching traits
pub use crate::backend::{ModuleMap, SignatureScanner};
