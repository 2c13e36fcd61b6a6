//! Entry schemas: the expected kind, constraints and optionality of one entry.

use serde::{Deserialize, Serialize};

use crate::model::{PodValue, PodValueType};

/// A value constraint attached to an entry schema.
///
/// Constraints are checked only after the candidate's kind matches the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Constraint {
    /// Value must equal one of `values`.
    IsMemberOf { values: Vec<PodValue> },
    /// Value must equal none of `values`.
    IsNotMemberOf { values: Vec<PodValue> },
    /// Numeric value must lie within `[min, max]`.
    InRange { min: PodValue, max: PodValue },
    /// Numeric value must lie outside `[min, max]`.
    NotInRange { min: PodValue, max: PodValue },
}

impl Constraint {
    /// Returns a short name used in issue messages.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::IsMemberOf { .. } => "isMemberOf",
            Constraint::IsNotMemberOf { .. } => "isNotMemberOf",
            Constraint::InRange { .. } => "inRange",
            Constraint::NotInRange { .. } => "notInRange",
        }
    }
}

/// Declared shape of one entry.
///
/// Schemas are values: the chaining methods consume `self` and return the
/// extended schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySchema {
    #[serde(rename = "type")]
    value_type: PodValueType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    optional: bool,
}

impl EntrySchema {
    pub fn new(value_type: PodValueType) -> Self {
        Self {
            value_type,
            constraints: Vec::new(),
            optional: false,
        }
    }

    /// Declares a string entry.
    pub fn string() -> Self {
        Self::new(PodValueType::String)
    }

    /// Declares an int entry.
    pub fn int() -> Self {
        Self::new(PodValueType::Int)
    }

    /// Declares a cryptographic entry.
    pub fn cryptographic() -> Self {
        Self::new(PodValueType::Cryptographic)
    }

    /// Declares a public key entry.
    pub fn eddsa_pubkey() -> Self {
        Self::new(PodValueType::EdDsaPublicKey)
    }

    /// Marks the entry as allowed to be absent.
    ///
    /// Constraints still apply whenever the value is present.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Requires the value to equal one of `values`.
    pub fn is_member_of(self, values: impl IntoIterator<Item = PodValue>) -> Self {
        self.constraint(Constraint::IsMemberOf {
            values: values.into_iter().collect(),
        })
    }

    /// Requires the value to differ from every one of `values`.
    pub fn is_not_member_of(self, values: impl IntoIterator<Item = PodValue>) -> Self {
        self.constraint(Constraint::IsNotMemberOf {
            values: values.into_iter().collect(),
        })
    }

    /// Requires `min <= value <= max`. Numeric kinds only.
    pub fn in_range(self, min: impl Into<PodValue>, max: impl Into<PodValue>) -> Self {
        self.constraint(Constraint::InRange {
            min: min.into(),
            max: max.into(),
        })
    }

    /// Requires the value to fall outside `min..=max`.
    pub fn not_in_range(self, min: impl Into<PodValue>, max: impl Into<PodValue>) -> Self {
        self.constraint(Constraint::NotInRange {
            min: min.into(),
            max: max.into(),
        })
    }

    /// Appends an arbitrary constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn value_type(&self) -> PodValueType {
        self.value_type
    }

    /// Constraints in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_chaining() {
        let schema = EntrySchema::int().in_range(0i64, 100i64).optional();
        assert_eq!(schema.value_type(), PodValueType::Int);
        assert!(schema.is_optional());
        assert_eq!(
            schema.constraints(),
            &[Constraint::InRange {
                min: PodValue::int(0),
                max: PodValue::int(100),
            }]
        );
    }

    #[test]
    fn test_schema_json_shape() {
        let schema = EntrySchema::string().is_member_of([PodValue::string("x")]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "string",
                "constraints": [
                    {"kind": "isMemberOf", "values": [{"type": "string", "value": "x"}]}
                ]
            })
        );

        let plain: EntrySchema = serde_json::from_value(serde_json::json!({"type": "int"})).unwrap();
        assert_eq!(plain, EntrySchema::int());
    }
}
