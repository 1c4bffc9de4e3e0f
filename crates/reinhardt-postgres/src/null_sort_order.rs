//! Null sort order helpers for index columns.

use reinhardt_relational::operations::NullSortOrder;

/// Whether `null_sort_orders` matches the server default for every column.
///
/// PostgreSQL sorts nulls last in ascending columns and first in descending
/// ones. An empty `is_descending` list means every column is descending.
pub fn is_default_null_sort_order(
	null_sort_orders: Option<&[NullSortOrder]>,
	is_descending: Option<&[bool]>,
) -> bool {
	let Some(orders) = null_sort_orders else {
		return true;
	};

	orders.iter().enumerate().all(|(i, order)| {
		let descending = match is_descending {
			Some([]) => true,
			Some(flags) => flags.get(i).copied().unwrap_or(false),
			None => false,
		};
		if descending {
			*order == NullSortOrder::NullsFirst
		} else {
			*order == NullSortOrder::NullsLast
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_relational::operations::NullSortOrder::*;
	use rstest::rstest;

	#[rstest]
	#[case(None, None, true)]
	#[case(Some(vec![NullsLast, NullsLast]), None, true)]
	#[case(Some(vec![NullsFirst]), None, false)]
	#[case(Some(vec![NullsLast, NullsFirst]), Some(vec![false, true]), true)]
	#[case(Some(vec![NullsFirst, NullsFirst]), Some(vec![]), true)]
	#[case(Some(vec![Unspecified]), None, false)]
	fn test_is_default_null_sort_order(
		#[case] orders: Option<Vec<NullSortOrder>>,
		#[case] descending: Option<Vec<bool>>,
		#[case] expected: bool,
	) {
		assert_eq!(
			is_default_null_sort_order(orders.as_deref(), descending.as_deref()),
			expected
		);
	}
}
