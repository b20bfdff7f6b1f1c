//! Type-safe identifier wrappers around store-assigned integer keys.
//!
//! Products and orders are keyed by `SERIAL` columns, so identities are
//! only known after an insert returns. The wrappers keep a product key
//! from being passed where an order key is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an `i32` identity with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Return the raw identity value.
            pub const fn into_inner(self) -> i32 {
                self.0
            }

            /// Whether the store has assigned this identity.
            ///
            /// `SERIAL` sequences start at 1, so zero marks an entity that
            /// has not been persisted.
            pub const fn is_assigned(self) -> bool {
                self.0 > 0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identity of a row in the `products` table.
    ProductId
}

define_id! {
    /// Identity of a row in the `orders` table.
    OrderId
}
