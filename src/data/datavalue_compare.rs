use crate::data::datatable::DataValue;
use std::cmp::Ordering;

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Compare two cell values under the grid's ordering policy, ignoring
/// direction. Precedence:
///   1. both null -> equal
///   2. nulls order after any non-null value
///   3. both readable as finite numbers -> numeric compare
///   4. otherwise case-insensitive string compare
///
/// Direction is applied by the caller and must NOT flip null placement;
/// use [`compare_for_direction`] for the full policy.
pub fn compare_values(a: &DataValue, b: &DataValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => compare_text(a, b),
        },
    }
}

fn compare_text(a: &DataValue, b: &DataValue) -> Ordering {
    a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase())
}

/// Directed comparison: nulls sort last regardless of direction, everything
/// else is reversed for descending.
pub fn compare_for_direction(a: &DataValue, b: &DataValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let cmp = compare_values(a, b);
            match direction {
                SortDirection::Ascending => cmp,
                SortDirection::Descending => cmp.reverse(),
            }
        }
    }
}
