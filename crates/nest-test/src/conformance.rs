//! Conformance Runner - checks engine properties over generated structures
//!
//! Properties:
//! - Round trip through flatten and pack, with and without expansion
//! - Deterministic flatten
//! - Leaf count agrees with flatten
//! - Reflexive structural comparison
//! - Wrapping a structure in a list changes its structure

use std::fmt;

use nest_core::{NestConfig, NestError, Value};
use nest_engine::Nest;
use nest_registry::{register_defaults, Registry};
use thiserror::Error;

use crate::{GeneratorConfig, StructureGenerator};

/// Property checked for each generated case
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    RoundTrip,
    ExpandedRoundTrip,
    Determinism,
    LeafCount,
    Reflexivity,
    WrapDiffers,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::RoundTrip,
        Property::ExpandedRoundTrip,
        Property::Determinism,
        Property::LeafCount,
        Property::Reflexivity,
        Property::WrapDiffers,
    ];
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Property::RoundTrip => "round trip",
            Property::ExpandedRoundTrip => "expanded round trip",
            Property::Determinism => "determinism",
            Property::LeafCount => "leaf count",
            Property::Reflexivity => "reflexivity",
            Property::WrapDiffers => "wrap differs",
        };
        f.write_str(name)
    }
}

/// One failed property check
#[derive(Error, Debug, Clone, PartialEq)]
#[error("case {case}: {property} violated: {detail}")]
pub struct Violation {
    pub case: usize,
    pub property: Property,
    pub detail: String,
}

/// Conformance run result
#[derive(Debug, Default)]
pub struct ConformanceReport {
    pub cases: usize,
    pub checks: usize,
    pub leaves: usize,
    /// Leaves recognised as registered tensors
    pub tensors: usize,
    pub violations: Vec<Violation>,
}

impl ConformanceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one property
    pub fn violations_of(&self, property: Property) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.property == property)
    }
}

/// Runs every property over a generated batch
pub struct ConformanceRunner {
    generator: GeneratorConfig,
    config: NestConfig,
    registry: Registry,
}

impl ConformanceRunner {
    /// Runner with default engine configuration and the well-known types
    /// registered in a private registry
    pub fn new(generator: GeneratorConfig) -> Self {
        Self::with_config(generator, NestConfig::default())
    }

    pub fn with_config(generator: GeneratorConfig, config: NestConfig) -> Self {
        let registry = Registry::new();
        if let Err(err) = register_defaults(&registry) {
            tracing::warn!(error = %err, "well-known types not registered");
        }
        registry.seal();
        ConformanceRunner {
            generator,
            config,
            registry,
        }
    }

    pub fn run(&self) -> ConformanceReport {
        let nest = Nest::with_registry(self.config.clone(), &self.registry);
        let mut generator = StructureGenerator::new(self.generator.clone());
        let mut report = ConformanceReport::new();

        for case in 0..self.generator.case_count {
            let value = generator.generate();
            report.cases += 1;
            for property in Property::ALL {
                report.checks += 1;
                if let Err(detail) = check(&nest, property, &value) {
                    report.violations.push(Violation {
                        case,
                        property,
                        detail,
                    });
                }
            }
            if let Ok(leaves) = nest.flatten(&value, true) {
                report.leaves += leaves.len();
                report.tensors += leaves
                    .iter()
                    .filter(|leaf| nest.classifier().is_tensor(leaf).unwrap_or(false))
                    .count();
            }
        }

        tracing::debug!(
            cases = report.cases,
            checks = report.checks,
            violations = report.violations.len(),
            "conformance run finished"
        );
        report
    }
}

fn check(nest: &Nest<'_>, property: Property, value: &Value) -> Result<(), String> {
    let fail = |err: NestError| err.to_string();
    match property {
        Property::RoundTrip | Property::ExpandedRoundTrip => {
            let expand = property == Property::ExpandedRoundTrip;
            let flat = nest.flatten(value, expand).map_err(fail)?;
            let packed = nest.pack(value, flat, expand).map_err(fail)?;
            if packed != *value {
                return Err("packed value differs from the original".into());
            }
        }
        Property::Determinism => {
            let first = nest.flatten(value, true).map_err(fail)?;
            let second = nest.flatten(value, true).map_err(fail)?;
            if first != second {
                return Err("two flattens disagree".into());
            }
        }
        Property::LeafCount => {
            for expand in [false, true] {
                let count = nest.leaf_count(value, expand).map_err(fail)?;
                let flat = nest.flatten(value, expand).map_err(fail)?;
                if count != flat.len() {
                    return Err(format!("leaf_count {} vs {} leaves", count, flat.len()));
                }
            }
        }
        Property::Reflexivity => {
            nest.assert_same_structure(value, value, true, true)
                .map_err(fail)?;
        }
        Property::WrapDiffers => {
            let wrapped = Value::list(vec![value.clone()]);
            if nest.same_structure(value, &wrapped, false, false).map_err(fail)? {
                return Err("wrapped value reported as the same structure".into());
            }
        }
    }
    Ok(())
}
