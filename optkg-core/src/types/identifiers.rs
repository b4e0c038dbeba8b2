//! Spur-based ID types for type-safe interned identifiers.
//!
//! Each ID type wraps a `lasso::Spur` to prevent cross-type confusion.
//! A `TaskId` cannot be accidentally used where a `WorkerId` is expected.
//! Tasks and workers are interned by separate interners, so `index()` is
//! dense and zero-based within each kind and can address `Vec` arenas.

use lasso::{Key, Spur};
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Spur);

        impl $name {
            /// Create a new ID from a `Spur`.
            pub fn new(spur: Spur) -> Self {
                Self(spur)
            }

            /// Get the inner `Spur`.
            pub fn inner(self) -> Spur {
                self.0
            }

            /// Dense zero-based index in interning order.
            pub fn index(self) -> usize {
                self.0.into_usize()
            }

            /// Rebuild an ID from a dense index.
            pub fn from_index(index: usize) -> Option<Self> {
                Spur::try_from_usize(index).map(Self)
            }
        }

        impl From<Spur> for $name {
            fn from(spur: Spur) -> Self {
                Self(spur)
            }
        }

        impl From<$name> for Spur {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Interned task (instance) identifier.
    TaskId
);

define_id!(
    /// Interned worker (annotator) identifier.
    WorkerId
);
