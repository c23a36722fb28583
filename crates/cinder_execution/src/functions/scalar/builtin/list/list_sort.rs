use cinder_error::{CinderError, Result};
use serde::{Deserialize, Serialize};

use crate::arrays::array::list::ListArray;
use crate::arrays::array::{Array, NullArray, OffsetIndex, UInt32Array};
use crate::arrays::batch::Batch;
use crate::arrays::compute::take::take;
use crate::arrays::datatype::{DataType, DataTypeId};
use crate::arrays::sort::global::GlobalSortState;
use crate::arrays::sort::local::LocalSortState;
use crate::arrays::sort::sort_layout::{SortColumn, SortLayout};
use crate::arrays::sort::{NullOrder, SortOrder};
use crate::expr::Expression;
use crate::functions::scalar::{PlannedScalarFunction, ScalarFunction, ScalarFunctionImpl};
use crate::functions::{plan_check_num_args_between, FunctionInfo, Signature};
use crate::logical::binder::bind_context::BindContext;

/// Sort the elements within each list of a list column.
///
/// Optionally takes a sort direction ('ASC'/'DESC') and a null placement
/// ('NULLS FIRST'/'NULLS LAST') as constant string arguments. Defaults come
/// from the session config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSort;

impl FunctionInfo for ListSort {
    fn name(&self) -> &'static str {
        "list_sort"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["array_sort"]
    }

    fn signatures(&self) -> &[Signature] {
        &[
            Signature {
                positional_args: &[DataTypeId::List],
                return_type: DataTypeId::List,
            },
            Signature {
                positional_args: &[DataTypeId::List, DataTypeId::Utf8],
                return_type: DataTypeId::List,
            },
            Signature {
                positional_args: &[DataTypeId::List, DataTypeId::Utf8, DataTypeId::Utf8],
                return_type: DataTypeId::List,
            },
        ]
    }
}

impl ScalarFunction for ListSort {
    fn plan(
        &self,
        bind_context: &BindContext,
        inputs: Vec<Expression>,
    ) -> Result<PlannedScalarFunction> {
        let datatypes = inputs
            .iter()
            .map(|expr| expr.datatype(bind_context))
            .collect::<Result<Vec<_>>>()?;

        plan_check_num_args_between(self, &datatypes, 1..=3)?;

        let order = if datatypes.len() >= 2 {
            try_parse_sort_order(&inputs[1])?
        } else {
            bind_context.config.default_sort_order
        };

        let null_order = if datatypes.len() == 3 {
            try_parse_null_order(&inputs[2])?
        } else {
            bind_context.config.default_null_order
        };

        plan_list_sort(Box::new(*self), bind_context, inputs, datatypes, order, null_order)
    }
}

/// Sort the elements within each list in the direction opposite the session
/// default.
///
/// Optionally takes a null placement as its second argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReverseSort;

impl FunctionInfo for ListReverseSort {
    fn name(&self) -> &'static str {
        "list_reverse_sort"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["array_reverse_sort"]
    }

    fn signatures(&self) -> &[Signature] {
        &[
            Signature {
                positional_args: &[DataTypeId::List],
                return_type: DataTypeId::List,
            },
            Signature {
                positional_args: &[DataTypeId::List, DataTypeId::Utf8],
                return_type: DataTypeId::List,
            },
        ]
    }
}

impl ScalarFunction for ListReverseSort {
    fn plan(
        &self,
        bind_context: &BindContext,
        inputs: Vec<Expression>,
    ) -> Result<PlannedScalarFunction> {
        let datatypes = inputs
            .iter()
            .map(|expr| expr.datatype(bind_context))
            .collect::<Result<Vec<_>>>()?;

        plan_check_num_args_between(self, &datatypes, 1..=2)?;

        let order = bind_context.config.default_sort_order.reverse();

        let null_order = if datatypes.len() == 2 {
            try_parse_null_order(&inputs[1])?
        } else {
            bind_context.config.default_null_order
        };

        plan_list_sort(Box::new(*self), bind_context, inputs, datatypes, order, null_order)
    }
}

fn try_parse_sort_order(expr: &Expression) -> Result<SortOrder> {
    if !expr.is_const_foldable() {
        return Err(CinderError::new("Sorting order must be a constant"));
    }

    let order = expr.clone().try_into_scalar()?.try_into_string()?;
    match order.to_uppercase().as_str() {
        "ASC" => Ok(SortOrder::Ascending),
        "DESC" => Ok(SortOrder::Descending),
        other => Err(CinderError::new(format!(
            "Sorting order must be either ASC or DESC, got '{other}'"
        ))),
    }
}

fn try_parse_null_order(expr: &Expression) -> Result<NullOrder> {
    if !expr.is_const_foldable() {
        return Err(CinderError::new("Null sorting order must be a constant"));
    }

    let null_order = expr.clone().try_into_scalar()?.try_into_string()?;
    match null_order.to_uppercase().as_str() {
        "NULLS FIRST" => Ok(NullOrder::NullsFirst),
        "NULLS LAST" => Ok(NullOrder::NullsLast),
        other => Err(CinderError::new(format!(
            "Null sorting order must be either NULLS FIRST or NULLS LAST, got '{other}'"
        ))),
    }
}

fn plan_list_sort(
    function: Box<dyn ScalarFunction>,
    bind_context: &BindContext,
    inputs: Vec<Expression>,
    datatypes: Vec<DataType>,
    order: SortOrder,
    null_order: NullOrder,
) -> Result<PlannedScalarFunction> {
    // Null-typed input binds to a null-typed pass-through; the sort engine is
    // never invoked.
    if datatypes[0].is_null() {
        return Ok(PlannedScalarFunction {
            function,
            return_type: DataType::Null,
            inputs,
            function_impl: Box::new(ListSortNullImpl),
        });
    }

    let element_type = match &datatypes[0] {
        DataType::List(meta) => meta.datatype.as_ref().clone(),
        other => {
            return Err(CinderError::new(format!(
                "Cannot sort elements of non-list type, got {other}"
            )))
        }
    };

    Ok(PlannedScalarFunction {
        function,
        return_type: datatypes[0].clone(),
        inputs,
        function_impl: Box::new(ListSortImpl {
            element_type,
            order,
            null_order,
            batch_size: bind_context.config.batch_size,
        }),
    })
}

/// Pass-through for null-typed inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSortNullImpl;

impl ScalarFunctionImpl for ListSortNullImpl {
    fn execute(&self, inputs: &[&Array]) -> Result<Array> {
        let len = inputs
            .first()
            .map(|arr| arr.len())
            .ok_or_else(|| CinderError::new("Missing list input"))?;
        Ok(Array::Null(NullArray::new(len)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSortImpl {
    element_type: DataType,
    order: SortOrder,
    null_order: NullOrder,
    batch_size: usize,
}

impl ScalarFunctionImpl for ListSortImpl {
    fn execute(&self, inputs: &[&Array]) -> Result<Array> {
        // Order arguments were consumed at plan time; only the list column is
        // read here.
        let list = match inputs.first() {
            Some(Array::List(arr)) => arr,
            Some(other) => {
                return Err(CinderError::new(format!(
                    "Expected list array, got {}",
                    other.datatype()
                )))
            }
            None => return Err(CinderError::new("Missing list input")),
        };

        sort_each_list(
            list,
            &self.element_type,
            self.order,
            self.null_order,
            self.batch_size,
        )
    }
}

/// Sort the elements of each list row independently.
///
/// Elements are flattened into (group id, element) sort keys with their
/// emission position as payload. Group id is the row ordinal and always
/// sorts ascending, which keeps every row's elements contiguous in the
/// globally sorted stream; the requested order applies only to the element
/// key. The sorted positions then drive a gather on the child array.
fn sort_each_list(
    list: &ListArray,
    element_type: &DataType,
    order: SortOrder,
    null_order: NullOrder,
    batch_size: usize,
) -> Result<Array> {
    let num_lists = list.len();
    let child = list.child_array().as_ref();
    let offsets = list.offsets();

    let layout = SortLayout::new([
        SortColumn::new_asc_nulls_last(DataType::UInt32),
        SortColumn::new(order, null_order, element_type.clone()),
    ]);

    let mut local = LocalSortState::new(layout.clone());
    let mut global = GlobalSortState::new(layout);

    // Chunk accumulators, flushed whenever a chunk fills.
    let mut group_ids: Vec<u32> = Vec::with_capacity(batch_size);
    let mut chunk_child_indices: Vec<usize> = Vec::with_capacity(batch_size);
    let mut positions: Vec<u32> = Vec::with_capacity(batch_size);

    // Emission-order record of child indices. Positions index into this to
    // recover the source element without assuming dense list offsets.
    let mut emitted_child_indices: Vec<usize> = Vec::new();

    let mut next_position: u32 = 0;
    let mut data_to_sort = false;

    for list_idx in 0..num_lists {
        // Nothing to do for null rows; the output row stays null.
        if !list.is_valid(list_idx).expect("row to be in bounds") {
            continue;
        }

        let start = offsets[list_idx].as_usize();
        let end = offsets[list_idx + 1].as_usize();

        let group_id = u32::try_from(list_idx).map_err(|_| {
            CinderError::new("List count exceeds the maximum addressable group id")
        })?;

        for child_idx in start..end {
            if group_ids.len() == batch_size {
                sink_chunk(&mut local, child, &group_ids, &chunk_child_indices, &positions)?;
                data_to_sort = true;
                group_ids.clear();
                chunk_child_indices.clear();
                positions.clear();
            }

            group_ids.push(group_id);
            chunk_child_indices.push(child_idx);
            positions.push(next_position);
            emitted_child_indices.push(child_idx);

            next_position = next_position.checked_add(1).ok_or_else(|| {
                CinderError::new("Element count exceeds the maximum sortable payload position")
            })?;
        }
    }

    if !group_ids.is_empty() {
        sink_chunk(&mut local, child, &group_ids, &chunk_child_indices, &positions)?;
        data_to_sort = true;
    }

    // Every row was null or empty; the input passes through unchanged.
    if !data_to_sort {
        return Ok(Array::List(list.clone()));
    }

    global.add_local_state(local)?;
    let mut scanner = global.into_payload_scanner(batch_size)?;

    let total = emitted_child_indices.len();
    let mut take_indices = Vec::with_capacity(total);
    while let Some(batch) = scanner.scan_next()? {
        let sorted_positions = match batch.column(0) {
            Some(Array::UInt32(arr)) => arr,
            other => {
                return Err(CinderError::new(format!(
                    "Unexpected payload column: {other:?}"
                )))
            }
        };

        for position in sorted_positions.iter() {
            let child_idx = *emitted_child_indices.get(position as usize).ok_or_else(|| {
                CinderError::new(
                    "Sorted payload position out of range, sink/scan pairing is broken",
                )
            })?;
            take_indices.push(child_idx);
        }
    }

    if take_indices.len() != total {
        return Err(CinderError::new(format!(
            "Sorted payload count {} does not match sunk element count {total}, \
             sink/scan pairing is broken",
            take_indices.len(),
        )));
    }

    let sorted_child = take(child, &take_indices)?;

    // Rebuild offsets densely. Group ids sorted ascending, so each row's
    // elements are contiguous in the sorted child in row order; every row
    // keeps its element count.
    let mut new_offsets = Vec::with_capacity(num_lists + 1);
    new_offsets.push(0i32);
    let mut current = 0usize;
    for list_idx in 0..num_lists {
        if list.is_valid(list_idx).expect("row to be in bounds") {
            let start = offsets[list_idx].as_usize();
            let end = offsets[list_idx + 1].as_usize();
            current += end - start;
        }
        new_offsets.push(i32::from_usize(current));
    }

    Ok(Array::List(ListArray::new(
        sorted_child,
        new_offsets,
        list.validity().cloned(),
    )))
}

/// Sink one flattened chunk into the local sort state.
fn sink_chunk(
    local: &mut LocalSortState,
    child: &Array,
    group_ids: &[u32],
    child_indices: &[usize],
    positions: &[u32],
) -> Result<()> {
    let elements = take(child, child_indices)?;
    let groups = Array::UInt32(UInt32Array::from_iter(group_ids.iter().copied()));
    let payload = Batch::try_new([Array::UInt32(UInt32Array::from_iter(
        positions.iter().copied(),
    ))])?;

    local.sink_batch(&[&groups, &elements], payload)
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::arrays::array::{Int32Array, Utf8Array};
    use crate::arrays::bitmap::Bitmap;
    use crate::arrays::scalar::ScalarValue;
    use crate::expr::{col_ref, lit};
    use crate::logical::binder::table_list::TableRef;

    /// Build a list array from per-row optional element vectors.
    fn make_i32_list(rows: &[Option<Vec<Option<i32>>>]) -> ListArray {
        let mut child_vals: Vec<Option<i32>> = Vec::new();
        let mut offsets = vec![0i32];
        let mut validity = Bitmap::default();
        let mut any_null = false;

        for row in rows {
            match row {
                Some(vals) => {
                    validity.push(true);
                    child_vals.extend(vals.iter().copied());
                }
                None => {
                    validity.push(false);
                    any_null = true;
                }
            }
            offsets.push(child_vals.len() as i32);
        }

        let child = Array::Int32(Int32Array::from_iter(child_vals));
        let validity = any_null.then_some(validity);
        ListArray::new(child, offsets, validity)
    }

    /// Bind context with a single table holding one list column of the given
    /// element type.
    fn list_bind_context(element_type: DataType) -> (BindContext, TableRef) {
        let mut bind_context = BindContext::default();
        let table_ref = bind_context
            .table_list
            .push_table(
                vec![DataType::list(element_type)],
                vec!["lists".to_string()],
            )
            .unwrap();
        (bind_context, table_ref)
    }

    fn plan_and_execute(
        function: &dyn ScalarFunction,
        extra_args: Vec<Expression>,
        input: &ListArray,
        element_type: DataType,
    ) -> ListArray {
        let (bind_context, table_ref) = list_bind_context(element_type);

        let mut inputs = vec![col_ref(table_ref, 0)];
        inputs.extend(extra_args);

        let planned = function.plan(&bind_context, inputs).unwrap();
        assert_eq!(input.data_type(), planned.return_type);

        let arr = Array::List(input.clone());
        match planned.function_impl.execute(&[&arr]).unwrap() {
            Array::List(out) => out,
            other => panic!("unexpected array: {other:?}"),
        }
    }

    #[test]
    fn sort_single_list_asc() {
        let input = make_i32_list(&[Some(vec![Some(3), Some(1), Some(2)])]);
        let out = plan_and_execute(&ListSort, Vec::new(), &input, DataType::Int32);

        let expected = make_i32_list(&[Some(vec![Some(1), Some(2), Some(3)])]);
        assert_eq!(expected, out);
    }

    #[test]
    fn sort_single_list_desc() {
        let input = make_i32_list(&[Some(vec![Some(3), Some(1), Some(2)])]);
        let out = plan_and_execute(&ListSort, vec![lit("DESC")], &input, DataType::Int32);

        let expected = make_i32_list(&[Some(vec![Some(3), Some(2), Some(1)])]);
        assert_eq!(expected, out);
    }

    #[test]
    fn sort_order_case_insensitive() {
        let input = make_i32_list(&[Some(vec![Some(3), Some(1), Some(2)])]);
        let out = plan_and_execute(&ListSort, vec![lit("desc")], &input, DataType::Int32);

        let expected = make_i32_list(&[Some(vec![Some(3), Some(2), Some(1)])]);
        assert_eq!(expected, out);
    }

    #[test]
    fn sort_element_nulls_first() {
        let input = make_i32_list(&[Some(vec![Some(2), None, Some(1)])]);
        let out = plan_and_execute(
            &ListSort,
            vec![lit("ASC"), lit("NULLS FIRST")],
            &input,
            DataType::Int32,
        );

        let expected = make_i32_list(&[Some(vec![None, Some(1), Some(2)])]);
        assert_eq!(expected, out);
    }

    #[test]
    fn sort_element_nulls_last() {
        let input = make_i32_list(&[Some(vec![None, Some(2), Some(1)])]);
        let out = plan_and_execute(
            &ListSort,
            vec![lit("ASC"), lit("NULLS LAST")],
            &input,
            DataType::Int32,
        );

        let expected = make_i32_list(&[Some(vec![Some(1), Some(2), None])]);
        assert_eq!(expected, out);
    }

    #[test]
    fn null_and_empty_rows_pass_through() {
        let input = make_i32_list(&[None, Some(vec![Some(1)]), Some(vec![])]);
        let out = plan_and_execute(&ListSort, Vec::new(), &input, DataType::Int32);

        assert_eq!(Some(ScalarValue::Null), out.scalar(0));
        assert_eq!(
            Some(ScalarValue::List(vec![ScalarValue::Int32(1)])),
            out.scalar(1)
        );
        assert_eq!(Some(ScalarValue::List(Vec::new())), out.scalar(2));
    }

    #[test]
    fn all_rows_null_or_empty_skips_sort() {
        let input = make_i32_list(&[None, Some(vec![]), None]);
        let out = plan_and_execute(&ListSort, Vec::new(), &input, DataType::Int32);

        assert_eq!(input, out);
    }

    #[test]
    fn group_isolation_two_lists() {
        let input = make_i32_list(&[
            Some(vec![Some(5), Some(4)]),
            Some(vec![Some(2), Some(9), Some(1)]),
        ]);
        let out = plan_and_execute(&ListSort, Vec::new(), &input, DataType::Int32);

        let expected = make_i32_list(&[
            Some(vec![Some(4), Some(5)]),
            Some(vec![Some(1), Some(2), Some(9)]),
        ]);
        assert_eq!(expected, out);
    }

    #[test]
    fn sort_idempotent_on_sorted_input() {
        let input = make_i32_list(&[Some(vec![Some(1), Some(2), Some(3)])]);
        let out = plan_and_execute(&ListSort, Vec::new(), &input, DataType::Int32);
        assert_eq!(input, out);

        let again = plan_and_execute(&ListSort, Vec::new(), &out, DataType::Int32);
        assert_eq!(out, again);
    }

    #[test]
    fn reverse_sort_matches_desc() {
        let input = make_i32_list(&[Some(vec![Some(3), None, Some(1), Some(2)])]);

        let reversed = plan_and_execute(&ListReverseSort, Vec::new(), &input, DataType::Int32);
        let desc = plan_and_execute(&ListSort, vec![lit("DESC")], &input, DataType::Int32);

        assert_eq!(desc, reversed);
    }

    #[test]
    fn reverse_sort_with_null_order() {
        let input = make_i32_list(&[Some(vec![Some(3), None, Some(1)])]);
        let out = plan_and_execute(
            &ListReverseSort,
            vec![lit("NULLS FIRST")],
            &input,
            DataType::Int32,
        );

        let expected = make_i32_list(&[Some(vec![None, Some(3), Some(1)])]);
        assert_eq!(expected, out);
    }

    #[test]
    fn sort_utf8_elements() {
        let child = Array::Utf8(Utf8Array::from_iter(["b", "aa", "a"]));
        let input = ListArray::new(child, vec![0, 3], None);

        let out = plan_and_execute(&ListSort, vec![lit("DESC")], &input, DataType::Utf8);

        assert_eq!(
            Some(ScalarValue::List(vec![
                ScalarValue::from("b"),
                ScalarValue::from("aa"),
                ScalarValue::from("a"),
            ])),
            out.scalar(0)
        );
    }

    #[test]
    fn null_typed_input_binds_to_null_passthrough() {
        let bind_context = BindContext::default();

        let planned = ListSort
            .plan(&bind_context, vec![lit(ScalarValue::Null)])
            .unwrap();
        assert_eq!(DataType::Null, planned.return_type);

        let arr = Array::Null(NullArray::new(2));
        let out = planned.function_impl.execute(&[&arr]).unwrap();
        assert_eq!(Array::Null(NullArray::new(2)), out);
    }

    #[test]
    fn non_constant_order_errors() {
        let (mut bind_context, table_ref) = list_bind_context(DataType::Int32);
        bind_context
            .table_list
            .push_table(vec![DataType::Utf8], vec!["orders".to_string()])
            .unwrap();

        let inputs = vec![col_ref(table_ref, 0), col_ref(1, 0)];
        let err = ListSort.plan(&bind_context, inputs).unwrap_err();
        assert_eq!("Sorting order must be a constant", err.message());
    }

    #[test]
    fn unrecognized_order_errors() {
        let (bind_context, table_ref) = list_bind_context(DataType::Int32);

        let inputs = vec![col_ref(table_ref, 0), lit("SIDEWAYS")];
        let err = ListSort.plan(&bind_context, inputs).unwrap_err();
        assert!(err.message().contains("must be either ASC or DESC"), "{err}");
    }

    #[test]
    fn unrecognized_null_order_errors() {
        let (bind_context, table_ref) = list_bind_context(DataType::Int32);

        let inputs = vec![col_ref(table_ref, 0), lit("ASC"), lit("NULLS MIDDLE")];
        let err = ListSort.plan(&bind_context, inputs).unwrap_err();
        assert!(
            err.message().contains("NULLS FIRST or NULLS LAST"),
            "{err}"
        );
    }

    #[test]
    fn non_list_input_errors() {
        let mut bind_context = BindContext::default();
        bind_context
            .table_list
            .push_table(vec![DataType::Int32], vec!["vals".to_string()])
            .unwrap();

        let err = ListSort.plan(&bind_context, vec![col_ref(0, 0)]).unwrap_err();
        assert!(err.message().contains("non-list type"), "{err}");
    }

    #[test]
    fn multi_chunk_group_isolation() {
        // Chunk capacity of 4 forces the multi-chunk sink and merge path.
        let imp = ListSortImpl {
            element_type: DataType::Int32,
            order: SortOrder::Ascending,
            null_order: NullOrder::NullsLast,
            batch_size: 4,
        };

        let input = make_i32_list(&[
            Some(vec![Some(9), Some(3), Some(7), Some(1), Some(5)]),
            None,
            Some(vec![Some(8), Some(2)]),
            Some(vec![]),
            Some(vec![Some(6), Some(0), Some(4)]),
        ]);

        let arr = Array::List(input);
        let out = match imp.execute(&[&arr]).unwrap() {
            Array::List(out) => out,
            other => panic!("unexpected array: {other:?}"),
        };

        let expected = make_i32_list(&[
            Some(vec![Some(1), Some(3), Some(5), Some(7), Some(9)]),
            None,
            Some(vec![Some(2), Some(8)]),
            Some(vec![]),
            Some(vec![Some(0), Some(4), Some(6)]),
        ]);
        assert_eq!(expected, out);
    }

    #[test]
    fn randomized_lists_match_std_sort() {
        let mut rng = ChaCha8Rng::seed_from_u64(14);

        let rows: Vec<Option<Vec<Option<i32>>>> = (0..64)
            .map(|_| {
                if rng.random_ratio(1, 10) {
                    return None;
                }
                let len = rng.random_range(0..12);
                let vals = (0..len)
                    .map(|_| {
                        if rng.random_ratio(1, 8) {
                            None
                        } else {
                            Some(rng.random_range(-100..100))
                        }
                    })
                    .collect();
                Some(vals)
            })
            .collect();

        let input = make_i32_list(&rows);

        // Small chunk size so the flattened stream spans many chunks.
        let imp = ListSortImpl {
            element_type: DataType::Int32,
            order: SortOrder::Ascending,
            null_order: NullOrder::NullsLast,
            batch_size: 16,
        };

        let arr = Array::List(input);
        let out = match imp.execute(&[&arr]).unwrap() {
            Array::List(out) => out,
            other => panic!("unexpected array: {other:?}"),
        };

        let expected_rows: Vec<Option<Vec<Option<i32>>>> = rows
            .iter()
            .map(|row| {
                row.as_ref().map(|vals| {
                    let mut vals = vals.clone();
                    // Nulls last, values ascending.
                    vals.sort_by_key(|v| (v.is_none(), *v));
                    vals
                })
            })
            .collect();
        let expected = make_i32_list(&expected_rows);

        assert_eq!(expected, out);
    }
}
