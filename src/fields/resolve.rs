use serde_json::Value;

use crate::catalog::unwrap_envelope;
use crate::config::ResolverThresholds;
use crate::error::LensWarning;

use super::RepresentationKind;
use super::shape::SHAPE_RULES;

/// Outcome of resolving one field, with the rule that decided it.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub kind: RepresentationKind,
    pub rule: &'static str,
    pub warning: Option<LensWarning>,
}

/// Maps field values to representation kinds using only the value's shape.
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    thresholds: ResolverThresholds,
}

impl Resolver {
    pub fn new(thresholds: ResolverThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ResolverThresholds {
        &self.thresholds
    }

    pub fn resolve(&self, field: &str, value: &Value) -> RepresentationKind {
        self.inspect(field, value).kind
    }

    /// Resolves `value` and reports which shape rule matched. Contradictory
    /// values resolve to a safe kind and carry a warning instead of failing.
    pub fn inspect(&self, field: &str, value: &Value) -> Resolution {
        let value = unwrap_envelope(value);

        let Some(rule) = SHAPE_RULES
            .iter()
            .find(|rule| (rule.matches)(value, &self.thresholds))
        else {
            return Resolution {
                kind: RepresentationKind::NestedGroup,
                rule: "fallback",
                warning: None,
            };
        };

        let warning = rule.degraded.then(|| {
            tracing::warn!(field, rule = rule.name, fallback = %rule.kind, "degraded malformed field value");
            LensWarning::MalformedRecord {
                field: field.to_owned(),
                rule: rule.name,
                fallback: rule.kind,
            }
        });

        Resolution {
            kind: rule.kind,
            rule: rule.name,
            warning,
        }
    }
}

/// [`Resolver::resolve`] with default thresholds.
pub fn resolve(field: &str, value: &Value) -> RepresentationKind {
    Resolver::default().resolve(field, value)
}
