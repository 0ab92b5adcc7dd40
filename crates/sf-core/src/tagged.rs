//! Externally tagged unions with three accepted input shapes.
//!
//! Serialization writes the externally tagged layout: a variant without payload is the bare tag
//! string, a variant with payload is a single-key map `{ "<Tag>": <payload> }`. It goes through a
//! plain map rather than serde's enum hooks so every format (YAML included) emits the same shape.
//!
//! Deserialization accepts exactly:
//! 1. the bare tag string, `"NoPower"`;
//! 2. the single-key map, `{ "Tag": { ... } }`;
//! 3. the normalized map, `{ "<tag_field>": "Tag", "<data_field>": { ... } }`, used when a value
//!    round-trips inside this system without crossing the wire.
//!
//! Anything else (unknown tag, extra keys, payload on a unit tag, missing payload) is an error
//! that names the offending tag or key.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserializer, Serialize, Serializer};

/// A closed set of variants with at most one payload type.
pub trait TaggedUnion: Sized {
    /// Payload carried by the variants that have one.
    type Payload: Serialize + DeserializeOwned;

    /// Type name used in error messages.
    const NAME: &'static str;
    /// Every accepted tag, in declaration order.
    const TAGS: &'static [&'static str];
    /// Key holding the tag in the normalized form.
    const TAG_FIELD: &'static str;
    /// Key holding the payload in the normalized form.
    const DATA_FIELD: &'static str;

    /// Build a value from a known tag and an optional payload.
    ///
    /// Must reject a payload on a unit tag and a missing payload on a data tag.
    fn from_parts(tag: &str, payload: Option<Self::Payload>) -> Result<Self, String>;

    /// Tag and payload of this value.
    fn to_parts(&self) -> (&'static str, Option<&Self::Payload>);
}

/// `Serialize` body for any [`TaggedUnion`].
pub fn serialize_tagged<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: TaggedUnion,
{
    match value.to_parts() {
        (tag, None) => serializer.serialize_str(tag),
        (tag, Some(payload)) => {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(tag, payload)?;
            map.end()
        }
    }
}

/// `deserialize_with` entry point for any [`TaggedUnion`].
pub fn deserialize_tagged<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TaggedUnion,
{
    deserializer.deserialize_any(TaggedVisitor::<T>(PhantomData))
}

struct TaggedVisitor<T>(PhantomData<T>);

impl<'de, T: TaggedUnion> Visitor<'de> for TaggedVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} as a bare tag string, a single-key map {{tag: payload}}, or a map with `{}` and `{}`",
            T::NAME,
            T::TAG_FIELD,
            T::DATA_FIELD
        )
    }

    fn visit_str<E: de::Error>(self, tag: &str) -> Result<T, E> {
        resolve::<T, E>(tag, None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<T, A::Error> {
        let first: String = match map.next_key()? {
            Some(key) => key,
            None => {
                return Err(de::Error::custom(format!(
                    "empty map is not a valid {}",
                    T::NAME
                )));
            }
        };

        if first == T::TAG_FIELD || first == T::DATA_FIELD {
            return visit_normalized::<T, A>(first, map);
        }

        if !T::TAGS.contains(&first.as_str()) {
            return Err(unknown_tag::<T, A::Error>(&first));
        }

        let payload: Option<T::Payload> = map.next_value()?;

        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "{} tagged map must have exactly one key, found `{}` and `{}`",
                T::NAME,
                first,
                extra
            )));
        }

        resolve::<T, A::Error>(&first, payload)
    }
}

fn visit_normalized<'de, T, A>(first: String, mut map: A) -> Result<T, A::Error>
where
    T: TaggedUnion,
    A: MapAccess<'de>,
{
    let mut tag: Option<String> = None;
    let mut data: Option<Option<T::Payload>> = None;

    let mut key = Some(first);
    while let Some(k) = key {
        if k == T::TAG_FIELD {
            if tag.is_some() {
                return Err(de::Error::duplicate_field(T::TAG_FIELD));
            }
            tag = Some(map.next_value()?);
        } else if k == T::DATA_FIELD {
            if data.is_some() {
                return Err(de::Error::duplicate_field(T::DATA_FIELD));
            }
            data = Some(map.next_value()?);
        } else {
            return Err(de::Error::custom(format!(
                "unexpected key `{}` in normalized {}, expected only `{}` and `{}`",
                k,
                T::NAME,
                T::TAG_FIELD,
                T::DATA_FIELD
            )));
        }
        key = map.next_key()?;
    }

    let tag = tag.ok_or_else(|| de::Error::missing_field(T::TAG_FIELD))?;
    resolve::<T, A::Error>(&tag, data.flatten())
}

fn resolve<T: TaggedUnion, E: de::Error>(tag: &str, payload: Option<T::Payload>) -> Result<T, E> {
    if !T::TAGS.contains(&tag) {
        return Err(unknown_tag::<T, E>(tag));
    }
    T::from_parts(tag, payload).map_err(E::custom)
}

fn unknown_tag<T: TaggedUnion, E: de::Error>(tag: &str) -> E {
    E::custom(format!(
        "unknown {} variant `{}`, expected one of {}",
        T::NAME,
        tag,
        T::TAGS
            .iter()
            .map(|t| format!("`{t}`"))
            .collect::<Vec<_>>()
            .join(", ")
    ))
}
