//! Field values that are written back in the shape they were read in.
//!
//! Calendar files leave keys out, set them to `null`, and write some
//! text fields as numbers. [Slot] remembers whether a key was missing or
//! null, and [Scalar] remembers whether a value was a number, so that an
//! exported course has exactly the keys and values of its source.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::{fmt, ops, result};

/// A field that may be missing, `null`, or have a value.
///
/// Use with `#[serde(default, skip_serializing_if = "Slot::is_absent")]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Slot<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Slot<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_deref(&self) -> Option<&T::Target>
    where
        T: ops::Deref,
    {
        self.get().map(|v| &**v)
    }
}

impl<T: Copy> Slot<T> {
    pub fn copied(&self) -> Option<T> {
        self.get().copied()
    }
}

impl<T> From<T> for Slot<T> {
    fn from(v: T) -> Self {
        Slot::Present(v)
    }
}

impl From<&str> for Slot<Scalar> {
    fn from(s: &str) -> Self {
        Slot::Present(s.into())
    }
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        match self {
            Slot::Present(v) => v.serialize(serializer),
            Slot::Absent | Slot::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Slot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Slot::Null, Slot::Present))
    }
}

/// A text field that some producers write as a number, e.g. `"Credits": 3`.
///
/// Reads as text either way; numbers are written back as numbers.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawScalar", into = "RawScalar")]
pub struct Scalar {
    text: String,
    number: Option<Number>,
}

#[derive(Deserialize, Serialize)]
#[serde(untagged, expecting = "a string or a number")]
enum RawScalar {
    Text(String),
    Number(Number),
}

impl From<RawScalar> for Scalar {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Text(text) => Scalar { text, number: None },
            RawScalar::Number(n) => Scalar {
                text: n.to_string(),
                number: Some(n),
            },
        }
    }
}

impl From<Scalar> for RawScalar {
    fn from(s: Scalar) -> Self {
        match s.number {
            Some(n) => RawScalar::Number(n),
            None => RawScalar::Text(s.text),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar {
            text: s.to_owned(),
            number: None,
        }
    }
}

impl ops::Deref for Scalar {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}
