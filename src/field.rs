// predicates are shared so field specs stay cloneable
use std::sync::Arc;

// used to print out readable forms of a field
use std::any::TypeId;
use std::fmt;

use crate::digest::Digest;
use crate::error::{PlugboardError, Result};
use crate::value::{AnyValue, DataType};

// ------------- OrderedMap -------------

/// Keyed collection with unique, ASCII case-insensitive keys and iteration
/// in insertion order. Small maps are expected (a handful of fields or
/// submodules per module), so lookups scan.
#[derive(Clone, Debug, Default)]
pub struct OrderedMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> OrderedMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn at(&self, key: &str) -> Result<&T> {
        self.position(key)
            .map(|i| &self.entries[i].1)
            .ok_or_else(|| PlugboardError::NotFound(key.to_string()))
    }

    pub fn at_mut(&mut self, key: &str) -> Result<&mut T> {
        match self.position(key) {
            Some(i) => Ok(&mut self.entries[i].1),
            None => Err(PlugboardError::NotFound(key.to_string())),
        }
    }

    /// Inserts under `key`, replacing the value (but keeping the original
    /// spelling and position) when the key is already present.
    pub fn insert(&mut self, key: &str, value: T) -> &mut T {
        match self.position(key) {
            Some(i) => {
                self.entries[i].1 = value;
                &mut self.entries[i].1
            }
            None => {
                self.entries.push((key.to_string(), value));
                &mut self.entries.last_mut().unwrap().1
            }
        }
    }

    /// Returns the value under `key`, creating a default one if absent.
    pub fn entry(&mut self, key: &str) -> &mut T
    where
        T: Default,
    {
        match self.position(key) {
            Some(i) => &mut self.entries[i].1,
            None => {
                self.entries.push((key.to_string(), T::default()));
                &mut self.entries.last_mut().unwrap().1
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), &mut *v))
    }
}

impl<T: PartialEq> PartialEq for OrderedMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka.eq_ignore_ascii_case(kb) && va == vb)
    }
}

/// Ordered keyed collection of field specs; the shape of every input and
/// result set in the framework.
pub type FieldMap = OrderedMap<FieldSpec>;

// ------------- FieldSpec -------------

/// Constraint predicate over candidate values.
pub type CheckFn = Arc<dyn Fn(&AnyValue) -> bool + Send + Sync>;

/// Declares one input or result slot: the declared type, an optional
/// description, a possibly-bound value, constraint predicates, and the
/// `optional` / `transparent` flags.
///
/// A value may only be assigned when it satisfies the declared type and
/// every predicate. `optional` relaxes the readiness check only; a value
/// that *is* assigned is always fully checked. A `transparent` field
/// contributes the zero sentinel to digest computation.
#[derive(Clone, Default)]
pub struct FieldSpec {
    declared: Option<TypeId>,
    type_name: Option<&'static str>,
    description: Option<String>,
    value: AnyValue,
    optional: bool,
    transparent: bool,
    checks: Vec<(CheckFn, String)>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec whose declared type and value both come from `value`; how
    /// fields are rehydrated out of the cache. Descriptions, flags and
    /// checks do not survive storage.
    pub(crate) fn holding(value: AnyValue) -> Self {
        Self {
            declared: value.type_key(),
            type_name: value.data_type(),
            value,
            ..Self::default()
        }
    }

    /// Declares the type values of this field must have. Changing the
    /// declared type drops a previously bound value of another type.
    pub fn set_type<T: DataType>(&mut self) -> &mut Self {
        self.declared = Some(TypeId::of::<T>());
        self.type_name = Some(T::DATA_TYPE);
        if self.value.has_value() && self.value.type_key() != self.declared {
            self.value = AnyValue::empty();
        }
        self
    }

    /// Binds `value` to this field. Fails with `NoType` before `set_type`,
    /// `WrongType` on a type mismatch and `Invalid` when a predicate
    /// rejects. The stored value is untouched on failure.
    pub fn change(&mut self, value: AnyValue) -> Result<&mut Self> {
        let declared = self
            .declared
            .ok_or_else(|| PlugboardError::NoType("value assigned before set_type".to_string()))?;
        if !value.has_value() {
            return Err(PlugboardError::Invalid(
                "cannot bind an empty value".to_string(),
            ));
        }
        if value.type_key() != Some(declared) {
            return Err(PlugboardError::WrongType {
                expected: self.type_name.unwrap_or("?").to_string(),
                found: value.data_type().unwrap_or("?").to_string(),
            });
        }
        for (check, what) in &self.checks {
            if !check(&value) {
                return Err(PlugboardError::Invalid(format!(
                    "value violates check: {what}"
                )));
            }
        }
        self.value = value;
        Ok(self)
    }

    /// Convenience wrapper around [`FieldSpec::change`] for native values.
    pub fn change_value<T: DataType>(&mut self, value: T) -> Result<&mut Self> {
        self.change(AnyValue::new(value))
    }

    /// Developer-facing spelling of `change` used while declaring defaults.
    pub fn set_default<T: DataType>(&mut self, value: T) -> Result<&mut Self> {
        self.change_value(value)
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds a constraint predicate. Fails with `Invalid` when a value is
    /// already bound and the new predicate rejects it.
    pub fn add_check(
        &mut self,
        check: impl Fn(&AnyValue) -> bool + Send + Sync + 'static,
        what: &str,
    ) -> Result<&mut Self> {
        if self.value.has_value() && !check(&self.value) {
            return Err(PlugboardError::Invalid(format!(
                "bound value violates new check: {what}"
            )));
        }
        self.checks.push((Arc::new(check), what.to_string()));
        Ok(self)
    }

    pub fn make_optional(&mut self) -> &mut Self {
        self.optional = true;
        self
    }

    pub fn make_required(&mut self) -> &mut Self {
        self.optional = false;
        self
    }

    pub fn make_transparent(&mut self) -> &mut Self {
        self.transparent = true;
        self
    }

    pub fn make_opaque(&mut self) -> &mut Self {
        self.transparent = false;
        self
    }

    // ------------- queries -------------

    pub fn has_type(&self) -> bool {
        self.declared.is_some()
    }

    pub fn has_value(&self) -> bool {
        self.value.has_value()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    pub fn type_key(&self) -> Option<TypeId> {
        self.declared
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A field is ready when it is optional or a value is bound.
    pub fn ready(&self) -> bool {
        self.optional || self.value.has_value()
    }

    /// Probes whether `value` could be bound. Never fails: a type mismatch
    /// or predicate rejection reports `false`.
    pub fn is_valid(&self, value: &AnyValue) -> bool {
        match self.declared {
            Some(declared) => {
                value.type_key() == Some(declared) && self.checks.iter().all(|(c, _)| c(value))
            }
            None => false,
        }
    }

    /// Borrows the bound value as `T`.
    pub fn value<T: DataType>(&self) -> Result<&T> {
        if !self.value.has_value() {
            return Err(PlugboardError::NotReady("no value bound".to_string()));
        }
        self.value.get::<T>()
    }

    /// The bound value container (possibly empty).
    pub fn any_value(&self) -> &AnyValue {
        &self.value
    }

    /// Digest contribution of this field. Transparent fields contribute the
    /// zero sentinel; everything else digests the bound value, so a
    /// typed-but-valueless field matches an empty value.
    pub fn digest(&self) -> Digest {
        if self.transparent {
            Digest::ZERO
        } else {
            self.value.digest()
        }
    }

    /// Human-readable descriptions of every constraint on this field, the
    /// declared-type check first, in registration order.
    pub fn check_descriptions(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.checks.len() + 1);
        if let Some(name) = self.type_name {
            out.push(format!("Type == {name}"));
        }
        for (_, what) in &self.checks {
            if !out.iter().any(|d| d == what) {
                out.push(what.clone());
            }
        }
        out
    }
}

impl PartialEq for FieldSpec {
    fn eq(&self, other: &Self) -> bool {
        self.declared == other.declared
            && self.description == other.description
            && self.value == other.value
            && self.optional == other.optional
            && self.transparent == other.transparent
            && self.check_descriptions() == other.check_descriptions()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("type", &self.type_name)
            .field("value", &self.value)
            .field("optional", &self.optional)
            .field("transparent", &self.transparent)
            .field("checks", &self.checks.len())
            .finish()
    }
}
