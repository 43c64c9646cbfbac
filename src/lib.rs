//! webitel-contacts - contact aggregation for the Webitel Terraform provider
//!
//! Implements the `unique_contact` provider function: merge CSV-like rows
//! into contacts grouped by configurable fields, deduplicating labels and
//! normalizing phone-like destinations. The aggregation core is a pure
//! function over plain typed shapes; the host's loosely-typed values are
//! converted once at the function boundary.

pub mod aggregate;
pub mod error;
pub mod function;
pub mod model;
pub mod value;

// Re-exports for convenience
pub use aggregate::{aggregate, collapse_spaces, normalize_destination};
pub use error::{ContactsError, Result};
pub use function::{
    CallFunctionRequest, CallFunctionResponse, Function, FunctionError, UniqueContactFunction,
};
pub use model::{Contact, ContactMap, Destination, MappingConfig, Record};
pub use value::{Dynamic, DynamicValue};
