//! Weave Core Types
//!
//! This crate provides the foundational types shared by the Weave schema
//! language front end and its object model:
//!
//! - **Identifiers**: String-interned names for types, fields and symbols ([`identifier::Id`])
//! - **Values**: The closed set of payloads a scalar object can hold ([`value::ScalarValue`])

pub mod identifier;
pub mod value;
