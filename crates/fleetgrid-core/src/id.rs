//! Typed ID wrappers for type-safe entity references

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Macro to define typed ID wrappers
macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
        )]
        pub struct $name(pub u32);

        impl $name {
            /// Create a new ID from a u32 value
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the inner u32 value
            #[inline]
            pub const fn as_u32(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(RobotId, "Unique identifier for a robot");
define_id!(PackageId, "Unique identifier for a package");
define_id!(StationId, "Unique identifier for a charging station");

/// ID generator for creating sequential IDs
#[derive(Debug, Clone, Default)]
pub struct IdGenerator<T> {
    next: u32,
    _marker: std::marker::PhantomData<T>,
}

impl<T> IdGenerator<T> {
    /// Create a new ID generator starting from 0
    pub fn new() -> Self {
        Self {
            next: 0,
            _marker: std::marker::PhantomData,
        }
    }

    /// Create a new ID generator starting from a specific value
    pub fn starting_from(start: u32) -> Self {
        Self {
            next: start,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get the next ID value without incrementing
    pub fn peek(&self) -> u32 {
        self.next
    }
}

macro_rules! impl_id_generator {
    ($id_type:ident) => {
        impl IdGenerator<$id_type> {
            /// Generate the next ID
            pub fn next_id(&mut self) -> $id_type {
                let id = $id_type(self.next);
                self.next += 1;
                id
            }
        }
    };
}

impl_id_generator!(RobotId);
impl_id_generator!(PackageId);
impl_id_generator!(StationId);
