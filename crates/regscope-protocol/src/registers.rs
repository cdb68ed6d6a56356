//! Payloads of the register listing commands.
//!
//! ```text
//! -data-list-register-names
//! ^done,register-names=["r0","r1","r2"]
//!
//! -data-list-register-values x
//! ^done,register-values=[{number="0",value="0x0"},{number="1",value="0x1"}]
//! ```
//!
//! Names are positional: the position of a name is its register number, and
//! empty strings mark numbers the target does not use. Values are keyed by
//! that same number.

use crate::error::{MiError, MiResult};
use crate::record::ResultRecord;
use crate::value::Value;

/// One `{number=..., value=...}` entry of a register value listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterValueEntry
{
    /// Register number, an index into the register name list
    pub number: usize,
    /// Value text as formatted by the backend
    pub value: String,
}

/// Extract `register-names` from a `^done` record.
///
/// ## Errors
///
/// - [`MiError::MissingField`] if the record has no `register-names`
/// - [`MiError::UnexpectedShape`] if it is not a list of strings
pub fn register_names(record: &ResultRecord) -> MiResult<Vec<String>>
{
    let field = "register-names";
    let list = record
        .field(field)
        .ok_or_else(|| MiError::MissingField(field.to_string()))?
        .as_list()
        .ok_or_else(|| shape(field, "list of strings"))?;

    list.iter()
        .map(|item| item.as_const().map(str::to_string).ok_or_else(|| shape(field, "list of strings")))
        .collect()
}

/// Extract `register-values` from a `^done` record.
///
/// Entries come back in the order the backend sent them.
///
/// ## Errors
///
/// - [`MiError::MissingField`] if the record has no `register-values`
/// - [`MiError::UnexpectedShape`] if an entry lacks a numeric `number` or a `value`
pub fn register_values(record: &ResultRecord) -> MiResult<Vec<RegisterValueEntry>>
{
    let field = "register-values";
    let list = record
        .field(field)
        .ok_or_else(|| MiError::MissingField(field.to_string()))?
        .as_list()
        .ok_or_else(|| shape(field, "list of tuples"))?;

    list.iter()
        .map(|item| {
            let number = item
                .field("number")
                .and_then(Value::as_const)
                .and_then(|text| text.parse::<usize>().ok())
                .ok_or_else(|| shape(field, "tuple with numeric 'number'"))?;
            let value = item
                .field("value")
                .and_then(Value::as_const)
                .ok_or_else(|| shape(field, "tuple with 'value'"))?;
            Ok(RegisterValueEntry {
                number,
                value: value.to_string(),
            })
        })
        .collect()
}

fn shape(field: &str, expected: &'static str) -> MiError
{
    MiError::UnexpectedShape {
        field: field.to_string(),
        expected,
    }
}
