//! Property types: named, declarative input/result contracts.
//!
//! A property type pairs an input [`FieldMap`] with a result [`FieldMap`]
//! and carries a stable identity (its own type path). Callers and modules
//! meet at this contract: a module *satisfies* a property type by carrying
//! all of its fields, and dispatch wraps native argument tuples into field
//! maps (and unwraps result maps back into native tuples) positionally,
//! following the declaration order of the contract.

use crate::error::{PlugboardError, Result};
use crate::field::{FieldMap, FieldSpec};
use crate::value::{AnyValue, DataType};

/// Stable identity of a property type or module implementation.
pub type TypeKey = &'static str;

// ------------- FieldTuple -------------

/// Native tuples that can be written into / read out of a [`FieldMap`]
/// positionally. Implemented for tuples of [`DataType`]s up to arity six.
pub trait FieldTuple: Sized {
    const LEN: usize;
    /// Assigns the tuple's elements to `keys` (in order) inside `map`.
    fn wrap_at(self, map: &mut FieldMap, keys: &[String]) -> Result<()>;
    /// Extracts the tuple's elements from `keys` (in order) out of `map`.
    fn unwrap_at(map: &FieldMap, keys: &[String]) -> Result<Self>;
}

macro_rules! impl_field_tuple {
    ($len:expr; $($t:ident => $idx:tt),*) => {
        impl<$($t: DataType),*> FieldTuple for ($($t,)*) {
            const LEN: usize = $len;
            #[allow(unused_variables)]
            fn wrap_at(self, map: &mut FieldMap, keys: &[String]) -> Result<()> {
                $( map.at_mut(&keys[$idx])?.change(AnyValue::new(self.$idx))?; )*
                Ok(())
            }
            #[allow(unused_variables)]
            fn unwrap_at(map: &FieldMap, keys: &[String]) -> Result<Self> {
                Ok(($( map.at(&keys[$idx])?.value::<$t>()?.clone(), )*))
            }
        }
    };
}

impl_field_tuple!(0; );
impl_field_tuple!(1; A => 0);
impl_field_tuple!(2; A => 0, B => 1);
impl_field_tuple!(3; A => 0, B => 1, C => 2);
impl_field_tuple!(4; A => 0, B => 1, C => 2, D => 3);
impl_field_tuple!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_field_tuple!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

// ------------- PropertyType -------------

/// The declarative contract between callers and modules.
///
/// Implementors provide two factories returning freshly populated field
/// maps; both are position-stable, the i-th element of the associated tuple
/// corresponding to the i-th declared field. A derived property type extends
/// its base by calling the base factory and appending fields.
pub trait PropertyType: 'static {
    /// Native shape of the declared inputs.
    type Inputs: FieldTuple;
    /// Native shape of the declared results.
    type Results: FieldTuple;

    /// Freshly produced input declaration.
    fn inputs() -> FieldMap;

    /// Freshly produced result declaration.
    fn results() -> FieldMap;

    /// Stable identity of this contract.
    fn type_key() -> TypeKey {
        std::any::type_name::<Self>()
    }

    /// Writes `args` positionally onto the declared input keys of `map`.
    /// `map` may be wider than the contract (a module's full input set);
    /// only the contract's keys are touched.
    fn wrap_inputs(mut map: FieldMap, args: Self::Inputs) -> Result<FieldMap> {
        let keys = declared_keys(&Self::inputs(), Self::Inputs::LEN, Self::type_key())?;
        args.wrap_at(&mut map, &keys)?;
        Ok(map)
    }

    /// Reads the declared inputs back out of `map` as a native tuple.
    fn unwrap_inputs(map: &FieldMap) -> Result<Self::Inputs> {
        let keys = declared_keys(&Self::inputs(), Self::Inputs::LEN, Self::type_key())?;
        Self::Inputs::unwrap_at(map, &keys)
    }

    /// Writes `values` positionally onto the declared result keys of `map`.
    fn wrap_results(mut map: FieldMap, values: Self::Results) -> Result<FieldMap> {
        let keys = declared_keys(&Self::results(), Self::Results::LEN, Self::type_key())?;
        values.wrap_at(&mut map, &keys)?;
        Ok(map)
    }

    /// Reads the declared results back out of `map` as a native tuple.
    fn unwrap_results(map: &FieldMap) -> Result<Self::Results> {
        let keys = declared_keys(&Self::results(), Self::Results::LEN, Self::type_key())?;
        Self::Results::unwrap_at(map, &keys)
    }
}

fn declared_keys(declared: &FieldMap, arity: usize, contract: TypeKey) -> Result<Vec<String>> {
    if declared.len() != arity {
        return Err(PlugboardError::Invalid(format!(
            "{contract} declares {} fields but its native tuple has {arity}",
            declared.len()
        )));
    }
    Ok(declared.keys().map(str::to_string).collect())
}

// ------------- declaration builder -------------

/// Chaining builder behind property-type factories.
pub struct FieldMapBuilder {
    map: FieldMap,
    last: Option<String>,
}

/// Starts a field declaration, typically inside `PropertyType::inputs` or
/// `PropertyType::results`.
pub fn declare_fields() -> FieldMapBuilder {
    FieldMapBuilder {
        map: FieldMap::new(),
        last: None,
    }
}

/// Extends an already declared map (how a derived property type appends to
/// its base).
pub fn extend_fields(map: FieldMap) -> FieldMapBuilder {
    FieldMapBuilder { map, last: None }
}

impl FieldMapBuilder {
    /// Appends a field of type `T` under `key`.
    pub fn field<T: DataType>(mut self, key: &str) -> Self {
        self.map.entry(key).set_type::<T>();
        self.last = Some(key.to_string());
        self
    }

    /// Describes the most recently appended field.
    pub fn description(mut self, text: &str) -> Self {
        if let Some(spec) = self.last_spec() {
            spec.set_description(text);
        }
        self
    }

    /// Marks the most recently appended field optional.
    pub fn optional(mut self) -> Self {
        if let Some(spec) = self.last_spec() {
            spec.make_optional();
        }
        self
    }

    /// Marks the most recently appended field transparent.
    pub fn transparent(mut self) -> Self {
        if let Some(spec) = self.last_spec() {
            spec.make_transparent();
        }
        self
    }

    fn last_spec(&mut self) -> Option<&mut FieldSpec> {
        let key = self.last.clone()?;
        self.map.at_mut(&key).ok()
    }

    pub fn build(self) -> FieldMap {
        self.map
    }
}
