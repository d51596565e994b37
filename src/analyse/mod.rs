//! Analysis: from unit descriptors to validated goal descriptions
//!
//! Runs element inspection, then parameter and projection validation, and
//! stops at the first validation error. Nothing is generated for a unit
//! that fails.

mod bean;
mod element;
mod regular;
mod shuffle;

pub use element::{BeanElement, GoalElement, RegularElement};
pub use shuffle::shuffle;

use crate::config::DefaultsConfig;
use crate::error::{invalid, Error, ErrorKind, Result};
use crate::goal::GoalDescription;
use crate::introspect::TypeModel;
use crate::model::{BuildersOptions, Unit};
use crate::types::ClassName;
use crate::util::upcase;
use std::collections::BTreeSet;

/// Validated goals of one unit
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// The type carrying the builders marker
    pub source: ClassName,
    /// The type to generate, e.g. `cube.CubeBuilders`
    pub generated: ClassName,
    pub goals: Vec<GoalDescription>,
}

/// Generated type for a source type: nesting names joined by `_`, plus
/// `Builders`
pub fn generated_name(source: &ClassName) -> ClassName {
    ClassName::new(
        &source.package,
        [format!("{}Builders", source.names.join("_"))],
    )
}

/// Analyse one unit
pub fn analyse(unit: &Unit, model: &TypeModel, defaults: &DefaultsConfig) -> Result<Analysis> {
    let source_name = ClassName::new(&unit.package, unit.source.split('.'));
    let source = model.get(&source_name).ok_or_else(|| {
        Error::Descriptor(format!("source type `{}` is not declared", unit.source))
    })?;

    element::check_goals_in_build(model, source, unit.builders.is_some())?;
    element::check_source(source)?;

    let options = defaults.apply(unit.builders.as_ref().unwrap_or(&BuildersOptions::default()));
    let elements = element::goal_elements(model, source, &options)?;

    // nested type names derive from the upcased goal name
    let mut names = BTreeSet::new();
    for e in &elements {
        let details = e.details();
        if !names.insert(upcase(&details.name)) {
            return invalid(ErrorKind::DuplicateGoalName, details.element.clone());
        }
    }

    let mut goals = Vec::with_capacity(elements.len());
    for e in &elements {
        let goal = match e {
            GoalElement::Regular(r) => GoalDescription::Regular(regular::validate(r, model)?),
            GoalElement::Bean(b) => GoalDescription::Bean(bean::validate(b, model)?),
        };
        goals.push(goal);
    }

    tracing::info!(
        source = %source_name.qualified(),
        goals = goals.len(),
        "analysed unit"
    );
    Ok(Analysis {
        generated: generated_name(&source_name),
        source: source_name,
        goals,
    })
}
