//! Type-safe object IDs.
//!
//! Router IDs and router-interface IDs are both small unsigned integers on
//! the call surface. Wrapping them in [`ObjectId`] with a phantom kind keeps
//! a rif from being passed where a vrid is expected.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Raw object ID as exchanged on the call surface.
pub type RawObjectId = u32;

/// Marker trait for object kinds.
pub trait ObjectKind: Send + Sync + 'static {
    /// Short name used in logs and error messages.
    fn type_name() -> &'static str;
}

/// A type-safe object ID.
///
/// # Examples
///
/// ```
/// use l3_sdk::{RifId, VrId};
///
/// let vrid = VrId::new(0);
/// let rif = RifId::new(12);
/// assert_eq!(vrid.as_raw(), 0);
/// assert!(rif.is_valid());
/// assert!(!RifId::INVALID.is_valid());
///
/// // This would fail to compile:
/// // fn takes_router(v: VrId) {}
/// // takes_router(rif);
/// ```
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct ObjectId<T: ObjectKind> {
    raw: RawObjectId,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: ObjectKind> ObjectId<T> {
    /// The reserved "no object" value.
    ///
    /// Passing it where a rif is optional (neighbor delete-all) selects the
    /// whole router instead of one interface.
    pub const INVALID: Self = Self {
        raw: RawObjectId::MAX,
        _marker: PhantomData,
    };

    pub const fn new(raw: RawObjectId) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub const fn as_raw(&self) -> RawObjectId {
        self.raw
    }

    pub const fn is_valid(&self) -> bool {
        self.raw != RawObjectId::MAX
    }

    /// Returns `None` for [`ObjectId::INVALID`].
    pub const fn valid(self) -> Option<Self> {
        if self.is_valid() {
            Some(self)
        } else {
            None
        }
    }
}

impl<T: ObjectKind> Clone for ObjectId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ObjectKind> Copy for ObjectId<T> {}

impl<T: ObjectKind> fmt::Debug for ObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::type_name(), self.raw)
    }
}

impl<T: ObjectKind> fmt::Display for ObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{} {}", T::type_name(), self.raw)
        } else {
            write!(f, "{} <invalid>", T::type_name())
        }
    }
}

impl<T: ObjectKind> PartialEq for ObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: ObjectKind> Eq for ObjectId<T> {}

impl<T: ObjectKind> PartialOrd for ObjectId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ObjectKind> Ord for ObjectId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: ObjectKind> Hash for ObjectId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: ObjectKind> From<RawObjectId> for ObjectId<T> {
    fn from(raw: RawObjectId) -> Self {
        Self::new(raw)
    }
}

macro_rules! define_object_kind {
    ($name:ident, $type_name:literal, $id_alias:ident) => {
        #[doc = concat!("Marker type for ", $type_name, " objects.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl ObjectKind for $name {
            fn type_name() -> &'static str {
                $type_name
            }
        }

        #[doc = concat!("ID of a ", $type_name, ".")]
        pub type $id_alias = ObjectId<$name>;
    };
}

define_object_kind!(VirtualRouterKind, "vrid", VrId);
define_object_kind!(RouterInterfaceKind, "rif", RifId);
