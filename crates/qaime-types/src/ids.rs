//! Typed identifiers for windows, modal instances, and persisted entities.
//!
//! `WindowId` and `ModalId` wrap UUIDv7 (time-ordered, unique per process
//! lifetime). They display as standard UUID text for logging; `short()` (first
//! 8 hex chars) is for human-facing UI only and never used as a lookup key.
//!
//! Entity ids (`InvoiceId`, `ProductId`, `CounterpartId`) are assigned by the
//! persistence collaborator and are plain integers on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A window registry identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(uuid::Uuid);

/// A modal instance identifier (UUIDv7), distinct from the backing entity id.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModalId(uuid::Uuid);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Create a new time-ordered ID (UUIDv7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// First 8 hex characters, for display only.
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }

            /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                uuid::Uuid::parse_str(s).map(Self)
            }

            /// A nil id, for sentinel values only.
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            /// Check if this is the nil ID.
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $T {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }

        impl From<$T> for uuid::Uuid {
            fn from(id: $T) -> uuid::Uuid {
                id.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }
    };
}

impl_typed_id!(WindowId, "WindowId");
impl_typed_id!(ModalId, "ModalId");

// ── Entity ids ──────────────────────────────────────────────────────────────

/// A persisted invoice id.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub u64);

/// A catalog product id.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

/// A customer or supplier id.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartId(pub u64);

macro_rules! impl_entity_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// The raw numeric value.
            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $T {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.0)
            }
        }
    };
}

impl_entity_id!(InvoiceId, "InvoiceId");
impl_entity_id!(ProductId, "ProductId");
impl_entity_id!(CounterpartId, "CounterpartId");
