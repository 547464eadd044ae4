//! Type-safe identifiers over `uuid::Uuid`.
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generic identifier wrapper giving compile-time separation between
/// entity kinds that would otherwise all just be a `Uuid`.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }

    /// Reinterpret this id as belonging to a different entity kind,
    /// keeping the same underlying UUID. Used when a participant's
    /// connection-scoped lurker id is promoted onto a registered member.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self::from(uuid::Uuid::parse_str(s)?))
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}
impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Hash for ID<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}
impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from(uuid::Uuid::deserialize(deserializer)?))
    }
}

/// Implemented by every domain entity that owns an `ID<Self>`.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Room;
    struct Session;

    #[test]
    fn ids_of_different_kinds_compare_by_uuid_only() {
        let a: ID<Room> = ID::default();
        let b: ID<Room> = a;
        assert_eq!(a, b);
    }

    #[test]
    fn cast_preserves_the_uuid() {
        let room: ID<Room> = ID::default();
        let session: ID<Session> = room.cast();
        assert_eq!(room.inner(), session.inner());
    }

    #[test]
    fn parse_round_trips_through_display() {
        let id: ID<Room> = ID::default();
        let text = id.to_string();
        let parsed: ID<Room> = ID::parse(&text).unwrap();
        assert_eq!(id, parsed);
    }
}
