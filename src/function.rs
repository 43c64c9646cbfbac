//! Provider function boundary
//!
//! The `Function` trait is the seam the host's expression evaluator calls
//! through: metadata, definition, and a call taking loosely-typed argument
//! values. `UniqueContactFunction` implements `unique_contact` on top of the
//! pure aggregation core, converting arguments once at this boundary.

use crate::aggregate::aggregate;
use crate::error::ContactsError;
use crate::model::{MappingConfig, Record};
use crate::value::{Dynamic, DynamicValue};
use async_trait::async_trait;
use std::collections::HashMap;

/// Error returned from a function call, optionally tied to one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionError {
    pub text: String,
    pub function_argument: Option<i64>,
}

impl FunctionError {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            function_argument: None,
        }
    }

    pub fn for_argument(text: impl Into<String>, argument: i64) -> Self {
        Self {
            text: text.into(),
            function_argument: Some(argument),
        }
    }
}

pub struct FunctionMetadataResponse {
    pub name: String,
}

pub struct Parameter {
    pub name: String,
    pub allow_null_value: bool,
    pub description: String,
}

pub struct FunctionDefinition {
    pub summary: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
}

pub struct CallFunctionRequest {
    pub arguments: Vec<DynamicValue>,
}

pub struct CallFunctionResponse {
    pub result: Option<DynamicValue>,
    pub error: Option<FunctionError>,
}

/// A provider function callable from configuration expressions.
#[async_trait]
pub trait Function: Send + Sync {
    async fn metadata(&self) -> FunctionMetadataResponse;
    async fn definition(&self) -> FunctionDefinition;
    async fn call(&self, request: CallFunctionRequest) -> CallFunctionResponse;
}

/// `unique_contact(csv, csv_mapping)` - merge contacts grouped by the
/// mapping's `group_by_fields`, deduplicating labels and destinations.
#[derive(Debug, Default)]
pub struct UniqueContactFunction;

impl UniqueContactFunction {
    pub fn new() -> Self {
        Self
    }

    fn run(arguments: &[DynamicValue]) -> Result<DynamicValue, FunctionError> {
        if arguments.len() != 2 {
            return Err(FunctionError::new(format!(
                "unique_contact expects 2 arguments, got {}",
                arguments.len()
            )));
        }

        let csv = require_argument(&arguments[0], 0)?;
        let csv_mapping = require_argument(&arguments[1], 1)?;

        let rows = csv.as_list().ok_or_else(|| {
            FunctionError::for_argument(
                ContactsError::mismatch("list of map", csv.type_name()).to_string(),
                0,
            )
        })?;

        let records = rows
            .iter()
            .map(Record::from_dynamic)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FunctionError::for_argument(e.to_string(), 0))?;

        let mapping = MappingConfig::from_dynamic(csv_mapping)
            .map_err(|e| FunctionError::for_argument(e.to_string(), 1))?;

        let contacts: HashMap<String, Dynamic> = aggregate(&records, &mapping)
            .into_iter()
            .map(|(key, contact)| (key, contact.into_dynamic()))
            .collect();

        Ok(DynamicValue::new(Dynamic::Map(contacts)))
    }
}

#[async_trait]
impl Function for UniqueContactFunction {
    async fn metadata(&self) -> FunctionMetadataResponse {
        FunctionMetadataResponse {
            name: "unique_contact".to_string(),
        }
    }

    async fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            summary: "Compute contacts data without duplicates".to_string(),
            description: "Merge contacts grouped by group_by_fields.".to_string(),
            parameters: vec![
                Parameter {
                    name: "csv".to_string(),
                    allow_null_value: false,
                    description: "Rows to aggregate, each a map of field name to value."
                        .to_string(),
                },
                Parameter {
                    name: "csv_mapping".to_string(),
                    allow_null_value: false,
                    description: "Field-name bindings controlling extraction, grouping and \
                                  labeling."
                        .to_string(),
                },
            ],
        }
    }

    async fn call(&self, request: CallFunctionRequest) -> CallFunctionResponse {
        match Self::run(&request.arguments) {
            Ok(result) => CallFunctionResponse {
                result: Some(result),
                error: None,
            },
            Err(error) => CallFunctionResponse {
                result: None,
                error: Some(error),
            },
        }
    }
}

// Arguments do not enable allow_null_value, and unknowns cannot be computed
// over, so both are rejected before any processing.
fn require_argument(value: &DynamicValue, argument: i64) -> Result<&Dynamic, FunctionError> {
    if value.is_null() || value.is_unknown() {
        return Err(FunctionError::for_argument(
            ContactsError::NullArgument.to_string(),
            argument,
        ));
    }
    Ok(&value.value)
}
