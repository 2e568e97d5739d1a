//! Object identity checker
//!
//! Guest objects are caller-owned storage. The storage only remembers which
//! host handle it was bound to; whether that handle still names a live host
//! object, and of which class, is always asked of the host. A handle the
//! host has retired reads as vacant storage.

use crate::error::{OsErr, OsResult};
use host_api::{HostHandle, HostKernel, ObjectClass};

/// Caller-owned storage for one guest kernel object
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ObjectCell {
    handle: Option<HostHandle>,
}

impl ObjectCell {
    /// Empty storage
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Host handle this storage was last bound to
    pub fn handle(&self) -> Option<HostHandle> {
        self.handle
    }

    pub(crate) fn bind(&mut self, handle: HostHandle) {
        self.handle = Some(handle);
    }

    pub(crate) fn clear(&mut self) {
        self.handle = None;
    }
}

/// A guest object type backed by exactly one host object
pub trait GuestObject {
    /// Host class the object maps onto
    const CLASS: ObjectClass;

    fn cell(&self) -> &ObjectCell;

    fn cell_mut(&mut self) -> &mut ObjectCell;
}

/// Implements [`GuestObject`] and the storage accessors for a type with a
/// `cell: ObjectCell` field and a `Default` impl.
macro_rules! guest_object {
    ($ty:ident, $class:expr) => {
        impl $crate::identity::GuestObject for $ty {
            const CLASS: host_api::ObjectClass = $class;

            fn cell(&self) -> &$crate::identity::ObjectCell {
                &self.cell
            }

            fn cell_mut(&mut self) -> &mut $crate::identity::ObjectCell {
                &mut self.cell
            }
        }

        impl $ty {
            /// Host handle this object is bound to, if it has been created
            pub fn handle(&self) -> Option<host_api::HostHandle> {
                self.cell.handle()
            }

            /// Views existing storage as this object type
            pub fn from_storage(cell: $crate::identity::ObjectCell) -> Self {
                let mut object = Self::default();
                object.cell = cell;
                object
            }

            /// Gives the storage back
            pub fn into_storage(self) -> $crate::identity::ObjectCell {
                self.cell
            }
        }
    };
}

pub(crate) use guest_object;

/// What a caller-supplied object reference currently denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// No storage was supplied
    Null,
    /// Storage holds no live object
    Vacant,
    /// A live object of the expected class
    Live(HostHandle),
    /// A live object of another class
    Other(HostHandle, ObjectClass),
}

impl Identity {
    /// Classifies `cell` against `expected`
    pub fn resolve<H: HostKernel + ?Sized>(
        host: &H,
        cell: Option<&ObjectCell>,
        expected: ObjectClass,
    ) -> Identity {
        let Some(cell) = cell else {
            return Identity::Null;
        };
        let Some(handle) = cell.handle else {
            return Identity::Vacant;
        };
        match host.object_class(handle) {
            None => Identity::Vacant,
            Some(class) if class == expected => Identity::Live(handle),
            Some(class) => Identity::Other(handle, class),
        }
    }

    /// Verdict for a create: only vacant storage may be initialised
    pub fn for_create(self) -> OsResult<()> {
        match self {
            Identity::Null => Err(OsErr::ObjPtrNull),
            Identity::Vacant => Ok(()),
            Identity::Live(_) => Err(OsErr::ObjCreated),
            Identity::Other(..) => Err(OsErr::ObjType),
        }
    }

    /// Verdict for any other operation: a live object of the expected class
    pub fn for_use(self) -> OsResult<HostHandle> {
        match self {
            Identity::Null => Err(OsErr::ObjPtrNull),
            Identity::Live(handle) => Ok(handle),
            Identity::Vacant | Identity::Other(..) => Err(OsErr::ObjType),
        }
    }
}
