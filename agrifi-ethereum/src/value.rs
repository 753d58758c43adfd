// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversion of decoded ABI values into opaque JSON values.
//!
//! Integers of every width are rendered as decimal strings, since most of them do
//! not fit a JSON number. Tuples keep their field names only when the interface
//! description names every component; otherwise they are positional arrays.

use alloy::{dyn_abi::DynSolValue, json_abi::Param, primitives::hex};
use serde_json::{Map, Value};

/// Converts the decoded outputs of a function into a single JSON value.
///
/// A function with one output returns that output; several outputs are treated as a
/// tuple whose components are the output parameters.
pub fn outputs_to_json(outputs: &[Param], mut values: Vec<DynSolValue>) -> Value {
    match (outputs, values.len()) {
        (_, 0) => Value::Null,
        ([output], 1) => to_json(values.remove(0), &output.components),
        _ => tuple_to_json(values, outputs),
    }
}

/// Converts a single decoded value. `components` describes the fields of a tuple, or
/// of the tuple elements of an array.
pub fn to_json(value: DynSolValue, components: &[Param]) -> Value {
    match value {
        DynSolValue::Bool(value) => Value::Bool(value),
        DynSolValue::Int(value, _) => Value::String(value.to_string()),
        DynSolValue::Uint(value, _) => Value::String(value.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..size])),
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Bytes(bytes) => Value::String(hex::encode_prefixed(bytes)),
        DynSolValue::String(value) => Value::String(value),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => Value::Array(
            values
                .into_iter()
                .map(|value| to_json(value, components))
                .collect(),
        ),
        DynSolValue::Tuple(values) => tuple_to_json(values, components),
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

fn tuple_to_json(values: Vec<DynSolValue>, components: &[Param]) -> Value {
    let named = components.len() == values.len()
        && components.iter().all(|param| !param.name.is_empty());
    if named {
        let fields = components
            .iter()
            .zip(values)
            .map(|(param, value)| (param.name.clone(), to_json(value, &param.components)))
            .collect::<Map<_, _>>();
        Value::Object(fields)
    } else {
        Value::Array(
            values
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    let components = components
                        .get(index)
                        .map(|param| param.components.as_slice())
                        .unwrap_or_default();
                    to_json(value, components)
                })
                .collect(),
        )
    }
}
