//! Owned collections which may be fetched together with their owner
//! or on first access.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde::{Serialize, Serializer};

use crate::db::ConnectionMethods;
use crate::query::BoolExpr;
use crate::util::get_or_init_once_lock;
use crate::{debug, DataObject, DataObjectOps, Error, Result};

/// When an owned collection is read from the database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fetch {
    /// Loaded in the same call that loads the owner.
    Eager,
    /// Loaded by an explicit call to [`OneToMany::load`].
    Lazy,
}

/// A [`DataObject`] whose rows carry a foreign key to an owning object.
pub trait Owned: DataObject {
    /// Name of the column holding the owner's primary key.
    const OWNER_COL: &'static str;
    /// Point this object at its owner.
    fn set_owner(&mut self, owner: i64);
}

/// The "many" side of a one-to-many relationship, held by the owner.
///
/// Values are cached after the first [`load`][OneToMany::load]. Until
/// then [`get`][OneToMany::get] returns `Error::ValueNotLoaded`.
#[derive(Clone, Debug)]
pub struct OneToMany<T: Owned> {
    owner: Option<i64>,
    values: OnceLock<Vec<T>>,
}

impl<T: Owned> OneToMany<T> {
    /// An unloaded collection with no owner.
    pub fn new() -> Self {
        OneToMany {
            owner: None,
            values: OnceLock::new(),
        }
    }

    /// Bind the collection to `owner`. Loaded values are kept and are
    /// pointed at `owner` when next saved.
    pub fn ensure_init(&mut self, owner: i64) {
        self.rebind(Some(owner));
    }

    pub(crate) fn rebind(&mut self, owner: Option<i64>) {
        self.owner = owner;
    }

    /// The primary key of the owning object, once it is known.
    pub fn owner(&self) -> Option<i64> {
        self.owner
    }

    /// Whether the values are available without a database call.
    pub fn is_loaded(&self) -> bool {
        self.values.get().is_some()
    }

    /// Returns the values. They must have already been loaded. If
    /// not, returns `Error::ValueNotLoaded`.
    pub fn get(&self) -> Result<&[T]> {
        self.values
            .get()
            .map(|v| v.as_slice())
            .ok_or(Error::ValueNotLoaded)
    }

    /// Replace the values. The collection is considered loaded afterwards.
    pub fn set(&mut self, values: Vec<T>) {
        self.values = OnceLock::from(values);
    }

    /// Append a value, loading the existing values first if needed.
    pub fn push(&mut self, conn: &impl ConnectionMethods, value: T) -> Result<()> {
        self.load(conn)?;
        if let Some(values) = self.values.get_mut() {
            values.push(value);
        }
        Ok(())
    }

    /// Loads the values owned by the owner from the database if
    /// necessary and returns a reference to them. A collection without
    /// an owner has no values.
    pub fn load(&self, conn: &impl ConnectionMethods) -> Result<&[T]> {
        get_or_init_once_lock(&self.values, || {
            let owner = match self.owner {
                Some(owner) => owner,
                None => return Ok(Vec::new()),
            };
            debug!("loading {} for owner {}", T::TABLE, owner);
            T::query()
                .filter(BoolExpr::eq(T::OWNER_COL, owner))
                .order_asc(T::PKCOL)
                .load(conn)
        })
        .map(|v| v.as_slice())
    }

    /// Save every loaded value, pointing each at the owner first.
    /// Does nothing if the values were never loaded.
    pub fn save(&mut self, conn: &impl ConnectionMethods) -> Result<()> {
        let owner = self.owner.ok_or(Error::ValueNotSaved)?;
        if let Some(values) = self.values.get_mut() {
            for value in values.iter_mut() {
                value.set_owner(owner);
                value.save(conn)?;
            }
        }
        Ok(())
    }
}

impl<T: Owned> Default for OneToMany<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two collections are equal when both are unloaded or both hold equal
/// values in the same order.
impl<T: Owned + PartialEq> PartialEq for OneToMany<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values.get() == other.values.get()
    }
}
impl<T: Owned + Eq> Eq for OneToMany<T> {}

impl<T: Owned + Hash> Hash for OneToMany<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.get().hash(state)
    }
}

impl<T: Owned + Serialize> Serialize for OneToMany<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.values.get().serialize(serializer)
    }
}

impl<T: Owned + fmt::Display> fmt::Display for OneToMany<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.values.get() {
            None => f.write_str("<not loaded>"),
            Some(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(v, f)?;
                }
                f.write_str("]")
            }
        }
    }
}
