//! Tri-state field presence

/// Whether a field was omitted, explicitly nulled, or set
///
/// A plain `Option` cannot tell "the caller did not mention this field" apart
/// from "the caller cleared it", and the two produce different manifests.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Presence<T> {
    /// Not provided; the manifest key is suppressed
    #[default]
    Absent,
    /// Explicitly null; the manifest key is emitted with a null token
    Null,
    /// Provided with a value
    Set(T),
}

impl<T> Presence<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_set(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Presence<&T> {
        match self {
            Self::Absent => Presence::Absent,
            Self::Null => Presence::Null,
            Self::Set(value) => Presence::Set(value),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Presence<U> {
        match self {
            Self::Absent => Presence::Absent,
            Self::Null => Presence::Null,
            Self::Set(value) => Presence::Set(f(value)),
        }
    }

    /// Promote to `Set` using `f` unless already set, returning the value.
    ///
    /// A `Null` field is promoted as well: setting a child of a cleared field
    /// replaces the null.
    pub fn get_or_insert_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        if !self.is_set() {
            *self = Self::Set(f());
        }
        match self {
            Self::Set(value) => value,
            _ => unreachable!("presence was promoted to Set above"),
        }
    }
}

impl<T> From<Option<T>> for Presence<T> {
    /// `None` maps to `Absent`; use `Presence::Null` explicitly to clear.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Absent,
        }
    }
}
