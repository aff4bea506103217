//! Shared fixtures: the geometry property types and modules used across
//! the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use plugboard::error::Result;
use plugboard::field::FieldMap;
use plugboard::manager::ModuleManager;
use plugboard::module::{ModuleBase, ModuleSpec, SubmoduleMap};
use plugboard::property::{declare_fields, PropertyType};

// ------------- property types -------------

pub struct Area;
impl PropertyType for Area {
    type Inputs = (f64, f64);
    type Results = (f64,);
    fn inputs() -> FieldMap {
        declare_fields()
            .field::<f64>("Dimension 1")
            .description("The length of the 1st dimension")
            .field::<f64>("Dimension 2")
            .description("The length of the 2nd dimension")
            .build()
    }
    fn results() -> FieldMap {
        declare_fields()
            .field::<f64>("Area")
            .description("The area of the shape")
            .build()
    }
}

pub struct Perimeter;
impl PropertyType for Perimeter {
    type Inputs = (f64, f64);
    type Results = (f64,);
    fn inputs() -> FieldMap {
        declare_fields()
            .field::<f64>("Dimension 1")
            .description("The length of the 1st dimension")
            .field::<f64>("Dimension 2")
            .description("The length of the 2nd dimension")
            .build()
    }
    fn results() -> FieldMap {
        declare_fields()
            .field::<f64>("Perimeter")
            .description("The perimeter of the shape")
            .build()
    }
}

pub struct PrismVolume;
impl PropertyType for PrismVolume {
    type Inputs = (Vec<f64>,);
    type Results = (f64, f64);
    fn inputs() -> FieldMap {
        declare_fields()
            .field::<Vec<f64>>("Dimensions")
            .description("The length of each dimension")
            .build()
    }
    fn results() -> FieldMap {
        declare_fields()
            .field::<f64>("Base area")
            .description("The area of the base")
            .field::<f64>("Volume")
            .description("The volume of the prism")
            .build()
    }
}

/// Contract with no inputs; exercises the empty-tuple path and lets cache
/// tests drive modules purely through bound instance state.
pub struct PointlessOption;
impl PropertyType for PointlessOption {
    type Inputs = ();
    type Results = (i64,);
    fn inputs() -> FieldMap {
        declare_fields().build()
    }
    fn results() -> FieldMap {
        declare_fields()
            .field::<i64>("Value")
            .description("Whatever the option worked out to")
            .build()
    }
}

/// Contract used to build submodule chains (and loops) out of one module.
pub struct ChainLink;
impl PropertyType for ChainLink {
    type Inputs = ();
    type Results = (i64,);
    fn inputs() -> FieldMap {
        declare_fields().build()
    }
    fn results() -> FieldMap {
        declare_fields()
            .field::<i64>("Links")
            .description("How many links were traversed")
            .build()
    }
}

// ------------- modules -------------

pub struct Rectangle;
impl ModuleBase for Rectangle {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<Area>();
        spec.description("Computes the area of a rectangle");
        spec.citation("Euclid. The Elements. 300 BCE");
        spec.add_input::<String>("Name")
            .set_description("The name of the rectangle")
            .set_default(String::new())?;
        spec.add_result::<String>("Picture")
            .set_description("An ASCII picture of the rectangle");
        spec.change_input("Dimension 1")?
            .set_description("The height of the rectangle");
        spec.change_input("Dimension 2")?
            .set_description("The width of the rectangle");
        Ok(())
    }

    fn run_(&self, inputs: &FieldMap, _submods: &SubmoduleMap) -> Result<FieldMap> {
        let (dim1, dim2) = Area::unwrap_inputs(inputs)?;
        let name = inputs.at("Name")?.value::<String>()?.clone();
        let area = dim1 * dim2;

        // picture captures the relative sizes only, not the scale
        let (mut rows, mut cols) = (10usize, 10usize);
        if dim1 > dim2 {
            cols = 5;
        } else if dim2 > dim1 {
            rows = 5;
        }
        let top = "*".repeat(cols);
        let space = " ".repeat(cols - 2);
        let mut pic = format!("{name} :\n{top}\n");
        for _ in 0..rows - 2 {
            pic.push_str(&format!("*{space}*\n"));
        }
        pic.push_str(&top);

        let mut out = Area::wrap_results(Area::results(), (area,))?;
        out.entry("Picture")
            .set_type::<String>()
            .change_value(pic)?;
        Ok(out)
    }
}

pub struct Prism;
impl ModuleBase for Prism {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<PrismVolume>();
        spec.description("Computes the volume of a prism");
        spec.citation("Euclid. The Elements. 300 BCE");
        spec.change_input("Dimensions")?
            .set_description("1st 2 elements are for the base, last is height");
        spec.add_submodule::<Area>("area")
            .set_description("Submodule used to compute base's area");
        Ok(())
    }

    fn run_(&self, inputs: &FieldMap, submods: &SubmoduleMap) -> Result<FieldMap> {
        let (dims,) = PrismVolume::unwrap_inputs(inputs)?;
        let (area,) = submods.at("area")?.run_as::<Area>((dims[0], dims[1]))?;
        let volume = area * dims[2];
        PrismVolume::wrap_results(PrismVolume::results(), (area, volume))
    }
}

/// Bare-bones area module with nothing beyond the contract.
pub struct FreeArea;
impl ModuleBase for FreeArea {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<Area>();
        spec.description("Computes the area of a rectangle, no frills");
        Ok(())
    }
    fn run_(&self, inputs: &FieldMap, _submods: &SubmoduleMap) -> Result<FieldMap> {
        let (dim1, dim2) = Area::unwrap_inputs(inputs)?;
        Area::wrap_results(Area::results(), (dim1 * dim2,))
    }
}

/// Area module that opts out of memoization.
pub struct SketchyArea;
impl ModuleBase for SketchyArea {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<Area>();
        spec.description("Computes the area, refuses to be cached");
        spec.turn_off_memoization();
        Ok(())
    }
    fn run_(&self, inputs: &FieldMap, _submods: &SubmoduleMap) -> Result<FieldMap> {
        let (dim1, dim2) = Area::unwrap_inputs(inputs)?;
        Area::wrap_results(Area::results(), (dim1 * dim2,))
    }
}

/// Doubles its bound "Option 1" input; cache tests drive it through
/// instance state alone.
pub struct Tally;
impl ModuleBase for Tally {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<PointlessOption>();
        spec.description("Doubles whatever Option 1 is bound to");
        spec.add_input::<i64>("Option 1")
            .set_description("The option under scrutiny");
        Ok(())
    }
    fn run_(&self, inputs: &FieldMap, _submods: &SubmoduleMap) -> Result<FieldMap> {
        let option = *inputs.at("Option 1")?.value::<i64>()?;
        PointlessOption::wrap_results(PointlessOption::results(), (option * 2,))
    }
}

/// Like [`Tally`] but carries a transparent label that must never reach
/// the digest.
pub struct TaggedTally;
impl ModuleBase for TaggedTally {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<PointlessOption>();
        spec.description("Doubles Option 1, ignores its label");
        spec.add_input::<i64>("Option 1")
            .set_description("The option under scrutiny");
        spec.add_input::<String>("Label")
            .set_description("Bookkeeping only")
            .make_transparent()
            .set_default(String::new())?;
        Ok(())
    }
    fn run_(&self, inputs: &FieldMap, _submods: &SubmoduleMap) -> Result<FieldMap> {
        let option = *inputs.at("Option 1")?.value::<i64>()?;
        PointlessOption::wrap_results(PointlessOption::results(), (option * 2,))
    }
}

/// One link of a submodule chain; used to build loops.
pub struct Chain;
impl ModuleBase for Chain {
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()> {
        spec.satisfies_property_type::<ChainLink>();
        spec.description("Counts links by asking the next one");
        spec.add_submodule::<ChainLink>("next")
            .set_description("The rest of the chain");
        Ok(())
    }
    fn run_(&self, _inputs: &FieldMap, submods: &SubmoduleMap) -> Result<FieldMap> {
        let (below,) = submods.at("next")?.run_as::<ChainLink>(())?;
        ChainLink::wrap_results(ChainLink::results(), (below + 1,))
    }
}

// ------------- helpers -------------

/// A manager loaded with the geometry modules and their defaults.
pub fn load_geometry() -> ModuleManager {
    let mut mm = ModuleManager::new();
    mm.add_module("Rectangle", Arc::new(Rectangle))
        .expect("register Rectangle");
    mm.add_module("Prism", Arc::new(Prism)).expect("register Prism");
    mm.set_default::<Area>(FieldMap::new(), "Rectangle")
        .expect("default Area");
    mm.set_default::<PrismVolume>(FieldMap::new(), "Prism")
        .expect("default PrismVolume");
    mm
}
