//! Plugboard – a pluggable computation framework for scientific and
//! engineering pipelines.
//!
//! Plugboard centers on the *module* concept: a self-contained computational
//! unit published against one or more *property types*, where:
//! * A [`value::AnyValue`] is a type-erased value with runtime type
//!   identity, equality, hashing and typed extraction.
//! * A [`field::FieldSpec`] declares one input or result slot (type,
//!   description, constraint predicates, `optional`/`transparent` flags).
//! * A [`field::FieldMap`] is an insertion-ordered, case-insensitive keyed
//!   collection of field specs.
//! * A [`property::PropertyType`] is a named contract pairing an input map
//!   with a result map, with positional wrap/unwrap between native tuples
//!   and field maps.
//! * A [`module::ModuleBase`] is the developer-authored unit; a
//!   [`module::ModuleInstance`] is its runtime wrapper with effective
//!   inputs, submodule wiring, lock lifecycle and profiling.
//!
//! Instances are owned and shared by the [`manager::ModuleManager`], which
//! routes `run_as` requests, wires submodules from per-property-type
//! defaults, and hands every implementation a content-addressed memoization
//! cache (see the `cache` module).
//!
//! ## Modules
//! * [`value`] – The [`value::DataType`] trait plus the provided concrete
//!   types, and the type-erased [`value::AnyValue`] container.
//! * [`digest`] – 128-bit content digests used as cache keys.
//! * [`field`] – Field declarations, validation and the ordered keyed map.
//! * [`property`] – Property-type contracts and positional tuple plumbing.
//! * [`module`] – The developer surface and the runtime instance.
//! * [`manager`] – The keyed registry and dispatch site.
//! * [`cache`] – Memoization backends (in-memory & SQLite) and the cache
//!   hierarchy.
//! * [`error`] – The crate-wide error enum.
//!
//! ## Memoization
//! Every run digests the opaque inputs, the bound submodules and the
//! implementation identity into a 128-bit key. Memoizable modules store
//! their result maps under that key; copies of a module share entries
//! because cache handles are keyed by implementation identity. Point a
//! manager at a directory with `change_save_location` and the entries
//! survive the process.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use plugboard::field::FieldMap;
//! use plugboard::manager::{no_inputs, ModuleManager};
//! use plugboard::module::{ModuleBase, ModuleSpec, SubmoduleMap};
//! use plugboard::property::{declare_fields, PropertyType};
//! use plugboard::error::Result;
//!
//! # fn main() -> Result<()> {
//! struct Area;
//! impl PropertyType for Area {
//!     type Inputs = (f64, f64);
//!     type Results = (f64,);
//!     fn inputs() -> FieldMap {
//!         declare_fields()
//!             .field::<f64>("Dimension 1")
//!             .field::<f64>("Dimension 2")
//!             .build()
//!     }
//!     fn results() -> FieldMap {
//!         declare_fields().field::<f64>("Area").build()
//!     }
//! }
//!
//! struct Rectangle;
//! impl ModuleBase for Rectangle {
//!     fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
//!         spec.satisfies_property_type::<Area>();
//!         spec.description("Computes the area of a rectangle");
//!         Ok(())
//!     }
//!     fn run_(&self, inputs: &FieldMap, _submods: &SubmoduleMap) -> Result<FieldMap> {
//!         let (dim1, dim2) = Area::unwrap_inputs(inputs)?;
//!         Area::wrap_results(Area::results(), (dim1 * dim2,))
//!     }
//! }
//!
//! let mut mm = ModuleManager::new();
//! mm.add_module("Rectangle", Arc::new(Rectangle))?;
//! mm.set_default::<Area>(no_inputs(), "Rectangle")?;
//! let (area,) = mm.run_as::<Area>("Rectangle", (1.23, 4.56))?;
//! assert!((area - 5.6088).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Status & Roadmap
//! The run lifecycle, digest contract and cache layout are settled; the
//! backend surface is intentionally small so further durable backends can
//! slot in behind `CacheBackend`.

pub mod cache;
pub mod digest;
pub mod error;
pub mod field;
pub mod manager;
pub mod module;
pub mod property;
pub mod value;
