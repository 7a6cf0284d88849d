//! Conjunctive record filtering over named fields.
//!
//! String fields match by substring, ordinal fields (dates, integers)
//! by inclusive lower or upper bound.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::department::Department;
use crate::employee::Employee;
use crate::error::{DomainError, DomainResult};
use crate::permission::Permission;

/// Comparable field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    Int(i64),
    Date(NaiveDate),
}

impl Ordinal {
    /// Parse an integer, falling back to an ISO date
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(Ordinal::Int(value));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Ordinal::Date)
            .map_err(|_| DomainError::validation("Integer or date expected, please try again"))
    }

    fn compare(&self, other: &Ordinal) -> Option<Ordering> {
        match (self, other) {
            (Ordinal::Int(a), Ordinal::Int(b)) => Some(a.cmp(b)),
            (Ordinal::Date(a), Ordinal::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Contains { field: String, value: String },
    Min { field: String, value: Ordinal },
    Max { field: String, value: Ordinal },
}

impl Predicate {
    /// Build a predicate from its kind name (`string`, `min` or `max`).
    pub fn parse(kind: &str, field: &str, raw: &str) -> DomainResult<Self> {
        let field = field.to_string();
        match kind {
            "string" => Ok(Predicate::Contains {
                field,
                value: raw.to_string(),
            }),
            "min" => Ok(Predicate::Min {
                field,
                value: Ordinal::parse(raw)?,
            }),
            "max" => Ok(Predicate::Max {
                field,
                value: Ordinal::parse(raw)?,
            }),
            _ => Err(DomainError::validation(
                "Parameter type should be string, max or min",
            )),
        }
    }

    /// Name of the field this predicate tests
    pub fn field(&self) -> &str {
        match self {
            Predicate::Contains { field, .. }
            | Predicate::Min { field, .. }
            | Predicate::Max { field, .. } => field,
        }
    }

    fn matches<T: Filterable>(&self, item: &T) -> DomainResult<bool> {
        let field = self.field();
        let value = item
            .field_value(field)
            .ok_or_else(|| DomainError::validation(format!("Unknown filter field '{}'", field)))?;

        match (self, value) {
            (Predicate::Contains { value: needle, .. }, FieldValue::Text(text)) => {
                Ok(text.contains(needle.as_str()))
            }
            (Predicate::Contains { .. }, FieldValue::Ordinal(_)) => Err(DomainError::validation(
                "Integer or date expected, please try again",
            )),
            (Predicate::Min { .. } | Predicate::Max { .. }, FieldValue::Text(_)) => Err(
                DomainError::validation("String expected, please try again"),
            ),
            (Predicate::Min { value: bound, .. }, FieldValue::Ordinal(actual)) => {
                compare_bound(field, &actual, bound).map(|o| o != Ordering::Less)
            }
            (Predicate::Max { value: bound, .. }, FieldValue::Ordinal(actual)) => {
                compare_bound(field, &actual, bound).map(|o| o != Ordering::Greater)
            }
        }
    }
}

fn compare_bound(field: &str, actual: &Ordinal, bound: &Ordinal) -> DomainResult<Ordering> {
    actual.compare(bound).ok_or_else(|| {
        DomainError::validation(format!("Bound for '{}' has the wrong type", field))
    })
}

/// A field value exposed for filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Ordinal(Ordinal),
}

/// Records that expose named fields to [`filter_records`]
pub trait Filterable {
    /// Value of `field`, or `None` if the record has no such field
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>>;
}

/// Keep the items matching every predicate, in input order.
///
/// # Errors
/// Unknown fields and kind/type mismatches are validation errors.
pub fn filter_records<'a, T, I>(items: I, predicates: &[Predicate]) -> DomainResult<Vec<&'a T>>
where
    T: Filterable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut kept = Vec::new();
    'items: for item in items {
        for predicate in predicates {
            if !predicate.matches(item)? {
                continue 'items;
            }
        }
        kept.push(item);
    }
    Ok(kept)
}

impl Filterable for Employee {
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "id" => Some(FieldValue::Text(self.id())),
            "name" => Some(FieldValue::Text(&self.name)),
            "role" => Some(FieldValue::Text(&self.role)),
            "address" => Some(FieldValue::Text(&self.address)),
            "start_date" => Some(FieldValue::Ordinal(Ordinal::Date(self.start_date))),
            "salary" => Some(FieldValue::Ordinal(Ordinal::Int(self.salary))),
            _ => None,
        }
    }
}

impl Filterable for Department {
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "id" => Some(FieldValue::Text(self.id())),
            "name" => Some(FieldValue::Text(&self.name)),
            "description" => Some(FieldValue::Text(&self.description)),
            "head_of_department" => Some(FieldValue::Text(&self.head_of_department)),
            _ => None,
        }
    }
}

impl Filterable for Permission {
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        match field {
            "name" => Some(FieldValue::Text(&self.name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::tests::new_employee;

    fn employees() -> Vec<Employee> {
        [
            ("emp_00000001", "SSSteve", 50000),
            ("emp_00000002", "SSSharon", 60000),
            ("emp_00000003", "James", 80000),
            ("emp_00000004", "Jim", 90000),
        ]
        .into_iter()
        .map(|(id, name, salary)| {
            let mut new = new_employee();
            new.name = name.to_string();
            new.salary = salary;
            Employee::create(id.to_string(), new).unwrap()
        })
        .collect()
    }

    fn names(found: &[&Employee]) -> Vec<String> {
        found.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_substring_filter() {
        let list = employees();
        let found = filter_records(&list, &[Predicate::parse("string", "name", "SSS").unwrap()])
            .unwrap();
        assert_eq!(names(&found), ["SSSteve", "SSSharon"]);
    }

    #[test]
    fn test_min_and_max_are_inclusive() {
        let list = employees();
        let min = Predicate::parse("min", "salary", "80000").unwrap();
        let max = Predicate::parse("max", "salary", "60000").unwrap();

        assert_eq!(names(&filter_records(&list, &[min.clone()]).unwrap()), ["James", "Jim"]);
        assert_eq!(
            names(&filter_records(&list, &[max]).unwrap()),
            ["SSSteve", "SSSharon"]
        );
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let list = employees();
        let predicates = [
            Predicate::parse("string", "name", "J").unwrap(),
            Predicate::parse("max", "salary", "85000").unwrap(),
        ];
        assert_eq!(names(&filter_records(&list, &predicates).unwrap()), ["James"]);
    }

    #[test]
    fn test_date_bounds() {
        let list = employees();
        let found =
            filter_records(&list, &[Predicate::parse("min", "start_date", "2024-10-02").unwrap()])
                .unwrap();
        assert_eq!(found.len(), 4);
        let found =
            filter_records(&list, &[Predicate::parse("min", "start_date", "2024-10-03").unwrap()])
                .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert_eq!(
            Predicate::parse("money", "salary", "45000").unwrap_err(),
            DomainError::validation("Parameter type should be string, max or min")
        );
    }

    #[test]
    fn test_type_mismatches_rejected() {
        let list = employees();
        assert_eq!(
            Predicate::parse("max", "salary", "Lots").unwrap_err(),
            DomainError::validation("Integer or date expected, please try again")
        );
        let on_text = Predicate::parse("min", "role", "70000").unwrap();
        assert!(filter_records(&list, &[on_text]).is_err());
        let on_number = Predicate::parse("string", "salary", "700").unwrap();
        assert!(filter_records(&list, &[on_number]).is_err());
        let wrong_ordinal = Predicate::parse("min", "start_date", "5").unwrap();
        assert!(filter_records(&list, &[wrong_ordinal]).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let list = employees();
        let predicate = Predicate::parse("string", "nickname", "J").unwrap();
        assert!(matches!(
            filter_records(&list, &[predicate]),
            Err(DomainError::Validation(_))
        ));
    }
}
