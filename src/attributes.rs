//! Dynamically typed attribute storage.
//!
//! Descriptor records, descriptor headers and statements keep their
//! attributes in an [`Attributes`] bag keyed by an enumerated field id. Values
//! are stored as an [`AttrValue`] and read back through [`FromAttr`], which
//! fails fast when the stored representation does not match the request.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt::Debug;
use std::hash::Hash;
use std::ptr;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Signed integer (SQLSMALLINT, SQLINTEGER, SQLLEN).
    Int(i64),
    /// Unsigned integer (SQLUSMALLINT, SQLUINTEGER, SQLULEN).
    UInt(u64),
    /// Caller-owned buffer address.
    Ptr(*mut c_void),
    /// Character data.
    Str(String),
}

impl AttrValue {
    /// A null pointer value.
    pub fn null_ptr() -> Self {
        AttrValue::Ptr(ptr::null_mut())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for AttrValue {
            fn from(v: $t) -> Self {
                AttrValue::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for AttrValue {
            fn from(v: $t) -> Self {
                AttrValue::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i16, i32, i64);
impl_from_unsigned!(u16, u32, u64, usize);

impl<T> From<*mut T> for AttrValue {
    fn from(p: *mut T) -> Self {
        AttrValue::Ptr(p as *mut c_void)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

/// Conversion from a stored [`AttrValue`] into a concrete representation.
pub trait FromAttr: Sized {
    /// Name used in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Convert, or `None` if the stored value has another representation.
    fn from_attr(value: &AttrValue) -> Option<Self>;
}

macro_rules! impl_from_attr_int {
    ($($t:ty),*) => {
        $(impl FromAttr for $t {
            const TYPE_NAME: &'static str = stringify!($t);

            fn from_attr(value: &AttrValue) -> Option<Self> {
                match value {
                    AttrValue::Int(v) => <$t>::try_from(*v).ok(),
                    AttrValue::UInt(v) => <$t>::try_from(*v).ok(),
                    _ => None,
                }
            }
        })*
    };
}

impl_from_attr_int!(i16, i32, i64, u16, u32, u64, usize);

impl FromAttr for *mut c_void {
    const TYPE_NAME: &'static str = "pointer";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Ptr(p) => Some(*p),
            // Integer zero is accepted as a null address.
            AttrValue::Int(0) | AttrValue::UInt(0) => Some(ptr::null_mut()),
            _ => None,
        }
    }
}

impl FromAttr for String {
    const TYPE_NAME: &'static str = "string";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Attribute bag keyed by an enumerated field id.
#[derive(Debug, Clone)]
pub struct Attributes<K> {
    values: HashMap<K, AttrValue>,
}

impl<K> Default for Attributes<K> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> Attributes<K> {
    /// Create an empty attribute bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an attribute has been set.
    pub fn contains(&self, key: K) -> bool {
        self.values.contains_key(&key)
    }

    /// Get the raw stored value.
    pub fn get_raw(&self, key: K) -> Option<&AttrValue> {
        self.values.get(&key)
    }

    /// Store a value, returning the previous one.
    pub fn insert(&mut self, key: K, value: AttrValue) -> Option<AttrValue> {
        self.values.insert(key, value)
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, key: K) -> Option<AttrValue> {
        self.values.remove(&key)
    }

    /// Read a value as `T`; `Ok(None)` when unset.
    pub fn get<T: FromAttr>(&self, key: K) -> Result<Option<T>> {
        match self.values.get(&key) {
            None => Ok(None),
            Some(value) => T::from_attr(value)
                .map(Some)
                .ok_or_else(|| Error::AttributeType {
                    attribute: format!("{:?}", key),
                    expected: T::TYPE_NAME,
                }),
        }
    }

    /// Read a value as `T`, falling back to `default` when unset.
    pub fn get_or<T: FromAttr>(&self, key: K, default: T) -> Result<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}
