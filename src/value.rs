// used for typed extraction out of the erased container
use std::any::{Any, TypeId};
// used to print out readable forms of a value
use std::fmt;
// used to indicate that values need to be hashable
use std::hash::{Hash, Hasher};

use crate::digest::{digest_of, Digest, Digester};
use crate::error::{PlugboardError, Result};

/// Printed form of a value container holding nothing.
pub const EMPTY_SENTINEL: &str = "<empty>";

pub trait DataType: fmt::Debug + PartialEq + Clone + Send + Sync + 'static {
    // static stuff which needs to be implemented downstream
    const UID: u8;
    const DATA_TYPE: &'static str;
    /// Stable byte encoding used for digests and for the persistent cache.
    fn canonical_bytes(&self) -> Vec<u8>;
    /// Inverse of `canonical_bytes`. `None` if the bytes do not decode.
    fn from_canonical(bytes: &[u8]) -> Option<Self>;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
    fn identifier(&self) -> u8 {
        Self::UID
    }
    fn display_text(&self) -> String {
        format!("{self:?}")
    }
}

// ------------- Data Types --------------
impl DataType for bool {
    const UID: u8 = 1; // needs to be unique
    const DATA_TYPE: &'static str = "bool";
    fn canonical_bytes(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }
}
impl DataType for i64 {
    const UID: u8 = 2;
    const DATA_TYPE: &'static str = "i64";
    fn canonical_bytes(&self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        Some(i64::from_le_bytes(bytes.try_into().ok()?))
    }
}
impl DataType for u64 {
    const UID: u8 = 3;
    const DATA_TYPE: &'static str = "u64";
    fn canonical_bytes(&self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }
}
impl DataType for f64 {
    const UID: u8 = 4;
    const DATA_TYPE: &'static str = "f64";
    fn canonical_bytes(&self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        Some(f64::from_le_bytes(bytes.try_into().ok()?))
    }
}
impl DataType for String {
    const UID: u8 = 5;
    const DATA_TYPE: &'static str = "String";
    fn canonical_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        String::from_utf8(bytes.to_vec()).ok()
    }
    fn display_text(&self) -> String {
        self.clone()
    }
}
impl DataType for Vec<f64> {
    const UID: u8 = 6;
    const DATA_TYPE: &'static str = "Vec<f64>";
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * 8);
        for v in self {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        if bytes.len() % 8 != 0 {
            return None;
        }
        Some(
            bytes
                .chunks_exact(8)
                .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
                .collect(),
        )
    }
}
impl DataType for Vec<String> {
    const UID: u8 = 7;
    const DATA_TYPE: &'static str = "Vec<String>";
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for s in self {
            out.extend_from_slice(&(s.len() as u64).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        out
    }
    fn from_canonical(bytes: &[u8]) -> Option<Self> {
        let mut rest = bytes;
        let count = read_u64(&mut rest)?;
        let mut items = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            let len = read_u64(&mut rest)? as usize;
            if rest.len() < len {
                return None;
            }
            let (head, tail) = rest.split_at(len);
            items.push(String::from_utf8(head.to_vec()).ok()?);
            rest = tail;
        }
        if rest.is_empty() {
            Some(items)
        } else {
            None
        }
    }
}

fn read_u64(rest: &mut &[u8]) -> Option<u64> {
    if rest.len() < 8 {
        return None;
    }
    let (head, tail) = rest.split_at(8);
    *rest = tail;
    Some(u64::from_le_bytes(head.try_into().ok()?))
}

// ------------- AnyValue -------------

/// Object-safe surface every storable type is erased behind.
trait AnyObject: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_erased(&self, other: &dyn AnyObject) -> bool;
    fn clone_erased(&self) -> Box<dyn AnyObject>;
    fn display_text(&self) -> String;
    fn data_type(&self) -> &'static str;
    fn identifier(&self) -> u8;
    fn type_key(&self) -> TypeId;
    fn canonical_bytes(&self) -> Vec<u8>;
}

impl<T: DataType> AnyObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn eq_erased(&self, other: &dyn AnyObject) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| self == o)
    }
    fn clone_erased(&self) -> Box<dyn AnyObject> {
        Box::new(self.clone())
    }
    fn display_text(&self) -> String {
        DataType::display_text(self)
    }
    fn data_type(&self) -> &'static str {
        T::DATA_TYPE
    }
    fn identifier(&self) -> u8 {
        T::UID
    }
    fn type_key(&self) -> TypeId {
        TypeId::of::<T>()
    }
    fn canonical_bytes(&self) -> Vec<u8> {
        DataType::canonical_bytes(self)
    }
}

/// Type-erased value container. Every input and result in the framework
/// flows through one of these. The stored runtime type is fixed at wrap
/// time; extraction succeeds only for that exact type.
pub struct AnyValue {
    inner: Option<Box<dyn AnyObject>>,
}

impl AnyValue {
    /// Wraps an owned value.
    pub fn new<T: DataType>(value: T) -> Self {
        Self {
            inner: Some(Box::new(value)),
        }
    }

    /// The distinguishable empty container.
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn has_value(&self) -> bool {
        self.inner.is_some()
    }

    /// Runtime type identity of the stored value, if any.
    pub fn type_key(&self) -> Option<TypeId> {
        self.inner.as_ref().map(|o| o.type_key())
    }

    /// Human-readable name of the stored type, if any.
    pub fn data_type(&self) -> Option<&'static str> {
        self.inner.as_ref().map(|o| o.data_type())
    }

    pub fn identifier(&self) -> Option<u8> {
        self.inner.as_ref().map(|o| o.identifier())
    }

    /// Borrows the stored value as `T`.
    pub fn get<T: DataType>(&self) -> Result<&T> {
        let found = self.data_type().unwrap_or(EMPTY_SENTINEL);
        match &self.inner {
            Some(obj) => obj
                .as_any()
                .downcast_ref::<T>()
                .ok_or_else(|| PlugboardError::WrongType {
                    expected: T::DATA_TYPE.to_string(),
                    found: found.to_string(),
                }),
            None => Err(PlugboardError::WrongType {
                expected: T::DATA_TYPE.to_string(),
                found: found.to_string(),
            }),
        }
    }

    /// Extracts a copy of the stored value as `T`.
    pub fn cast<T: DataType>(&self) -> Result<T> {
        self.get::<T>().cloned()
    }

    /// True exactly when `cast::<T>` would succeed.
    pub fn is_convertible<T: DataType>(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|o| o.type_key() == TypeId::of::<T>())
    }

    /// 128-bit content digest of the stored value.
    ///
    /// The digested stream is frozen: one tag byte (the type's `UID`)
    /// followed by the value's canonical little-endian bytes. The empty
    /// container digests the zero-length stream, so every empty value (and
    /// every typed field with no bound value) shares the digest
    /// [`crate::digest::EMPTY_STREAM_DIGEST`].
    pub fn digest(&self) -> Digest {
        match &self.inner {
            Some(obj) => {
                let mut d = Digester::new();
                d.update(&[obj.identifier()]);
                d.update(&obj.canonical_bytes());
                d.finish()
            }
            None => digest_of(&[]),
        }
    }

    /// `(UID, canonical bytes)` pair used by the persistent cache.
    pub fn tagged_bytes(&self) -> Option<(u8, Vec<u8>)> {
        self.inner
            .as_ref()
            .map(|o| (o.identifier(), o.canonical_bytes()))
    }

    /// Reconstructs a value stored by `tagged_bytes`.
    ///
    /// MAINTENANCE: The match below needs to be extended when new built-in
    /// data types are added.
    pub fn from_tagged(uid: u8, bytes: &[u8]) -> Result<Self> {
        fn decode<T: DataType>(bytes: &[u8]) -> Result<AnyValue> {
            T::from_canonical(bytes)
                .map(AnyValue::new)
                .ok_or_else(|| {
                    PlugboardError::Backend(format!(
                        "stored bytes do not decode as {}",
                        T::DATA_TYPE
                    ))
                })
        }
        match uid {
            <bool as DataType>::UID => decode::<bool>(bytes),
            <i64 as DataType>::UID => decode::<i64>(bytes),
            <u64 as DataType>::UID => decode::<u64>(bytes),
            <f64 as DataType>::UID => decode::<f64>(bytes),
            <String as DataType>::UID => decode::<String>(bytes),
            <Vec<f64> as DataType>::UID => decode::<Vec<f64>>(bytes),
            <Vec<String> as DataType>::UID => decode::<Vec<String>>(bytes),
            _ => Err(PlugboardError::Backend(format!(
                "unknown data type identifier {uid}"
            ))),
        }
    }
}

impl Default for AnyValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl Clone for AnyValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.as_ref().map(|o| o.clone_erased()),
        }
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => a.eq_erased(b.as_ref()),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Hash for AnyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(obj) = &self.inner {
            state.write_u8(obj.identifier());
            state.write(&obj.canonical_bytes());
        }
    }
}

impl fmt::Display for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            Some(obj) => write!(f, "{}", obj.display_text()),
            None => write!(f, "{EMPTY_SENTINEL}"),
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            Some(obj) => write!(f, "AnyValue({}: {})", obj.data_type(), obj.display_text()),
            None => write!(f, "AnyValue({EMPTY_SENTINEL})"),
        }
    }
}
