//! Serialization support, enabled by the `serde` feature.
//!
//! An owner is represented as `Option<T>`: an empty owner is `None`.

use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Deleter, ExclusiveOwner};

impl<T: ?Sized + Serialize, D: Deleter<T>> Serialize for ExclusiveOwner<T, D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_ref() {
            Some(value) => serializer.serialize_some(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ExclusiveOwner<T> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => ExclusiveOwner::new(value),
            None => ExclusiveOwner::empty(),
        })
    }
}
