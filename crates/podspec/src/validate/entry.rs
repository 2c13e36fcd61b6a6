//! Per-entry validation against an [`EntrySchema`].

use std::cmp::Ordering;

use crate::model::PodValue;
use crate::spec::{Constraint, EntrySchema};
use crate::validate::{Issue, IssueCode, ValidationResult};

/// Validates one candidate value against `schema`.
///
/// `candidate` is `None` when the entry is absent from the record, which is
/// distinct from a present value of the wrong kind. Constraint checks run
/// only once the kind matches, and every violated constraint is reported.
/// Succeeds with `None` for an absent optional entry.
pub fn validate_entry<'v>(
    schema: &EntrySchema,
    candidate: Option<&'v PodValue>,
    path: &[String],
) -> ValidationResult<Option<&'v PodValue>> {
    let Some(value) = candidate else {
        if schema.is_optional() {
            return ValidationResult::Success(None);
        }
        return ValidationResult::Failure(vec![Issue::new(
            IssueCode::MissingEntry,
            path.to_vec(),
            format!("required {} entry is missing", schema.value_type()),
        )]);
    };

    if value.value_type() != schema.value_type() {
        return ValidationResult::Failure(vec![Issue::new(
            IssueCode::WrongType,
            path.to_vec(),
            format!(
                "expected {}, found {}",
                schema.value_type(),
                value.value_type()
            ),
        )]);
    }

    let issues: Vec<Issue> = schema
        .constraints()
        .iter()
        .filter_map(|constraint| check_constraint(constraint, value))
        .map(|message| Issue::new(IssueCode::ConstraintViolated, path.to_vec(), message))
        .collect();

    if issues.is_empty() {
        ValidationResult::Success(Some(value))
    } else {
        ValidationResult::Failure(issues)
    }
}

/// Returns a violation message, or `None` if `value` satisfies `constraint`.
fn check_constraint(constraint: &Constraint, value: &PodValue) -> Option<String> {
    match constraint {
        Constraint::IsMemberOf { values } => (!values.contains(value)).then(|| {
            format!("{value} is not one of the {} allowed values", values.len())
        }),
        Constraint::IsNotMemberOf { values } => values
            .contains(value)
            .then(|| format!("{value} is one of the excluded values")),
        Constraint::InRange { min, max } => (!in_range(value, min, max))
            .then(|| format!("{value} is outside the range [{min}, {max}]")),
        Constraint::NotInRange { min, max } => in_range(value, min, max)
            .then(|| format!("{value} is inside the excluded range [{min}, {max}]")),
    }
}

fn in_range(value: &PodValue, min: &PodValue, max: &PodValue) -> bool {
    matches!(
        value.numeric_cmp(min),
        Some(Ordering::Greater | Ordering::Equal)
    ) && matches!(value.numeric_cmp(max), Some(Ordering::Less | Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;

    fn path() -> Vec<String> {
        vec!["a".to_string()]
    }

    fn codes<T>(result: &ValidationResult<T>) -> Vec<IssueCode> {
        result.issues().iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_optional_absent_succeeds() {
        let schema = EntrySchema::string().optional();
        assert_eq!(
            validate_entry(&schema, None, &path()),
            ValidationResult::Success(None)
        );
    }

    #[test]
    fn test_required_absent_is_missing() {
        let result = validate_entry(&EntrySchema::string(), None, &path());
        assert_eq!(codes(&result), vec![IssueCode::MissingEntry]);
        assert_eq!(result.issues()[0].path, path());
    }

    #[test]
    fn test_wrong_type_single_issue() {
        let schema = EntrySchema::string()
            .optional()
            .is_member_of([PodValue::string("x")]);
        let value = PodValue::int(5);
        let result = validate_entry(&schema, Some(&value), &path());
        assert_eq!(codes(&result), vec![IssueCode::WrongType]);
        let message = &result.issues()[0].message;
        assert!(message.contains("string") && message.contains("int"));
    }

    #[test]
    fn test_optional_present_still_constrained() {
        let schema = EntrySchema::int().optional().in_range(0i64, 10i64);
        let value = PodValue::int(11);
        let result = validate_entry(&schema, Some(&value), &path());
        assert_eq!(codes(&result), vec![IssueCode::ConstraintViolated]);
    }

    #[test]
    fn test_all_constraint_violations_collected() {
        let schema = EntrySchema::int()
            .in_range(0i64, 10i64)
            .is_member_of([PodValue::int(1), PodValue::int(2)])
            .is_not_member_of([PodValue::int(20)]);
        let value = PodValue::int(20);
        let result = validate_entry(&schema, Some(&value), &path());
        assert_eq!(
            codes(&result),
            vec![
                IssueCode::ConstraintViolated,
                IssueCode::ConstraintViolated,
                IssueCode::ConstraintViolated
            ]
        );
    }

    #[test]
    fn test_int_range_uses_full_width() {
        let schema = EntrySchema::int().in_range(i64::MIN, i64::MAX);
        for v in [i64::MIN, -1, 0, i64::MAX] {
            let value = PodValue::int(v);
            assert!(validate_entry(&schema, Some(&value), &path()).is_success());
        }

        let schema = EntrySchema::int().not_in_range(-5i64, 5i64);
        let inside = PodValue::int(-5);
        let outside = PodValue::int(6);
        assert!(!validate_entry(&schema, Some(&inside), &path()).is_success());
        assert!(validate_entry(&schema, Some(&outside), &path()).is_success());
    }

    #[test]
    fn test_cryptographic_range_is_arbitrary_precision() {
        let max = BigUint::from(u64::MAX) * 1000u32;
        let schema = EntrySchema::cryptographic().in_range(BigUint::from(0u32), max.clone());
        let inside = PodValue::cryptographic(max.clone());
        let outside = PodValue::cryptographic(max + 1u32);
        assert!(validate_entry(&schema, Some(&inside), &path()).is_success());
        assert_eq!(
            codes(&validate_entry(&schema, Some(&outside), &path())),
            vec![IssueCode::ConstraintViolated]
        );
    }
}
