use std::collections::HashMap;

use crate::common::function::FunctionCode;
use crate::common::frame::Request;
use crate::error::InvalidRequest;
use crate::types::{ReadRange, WriteMultiple, WriteSingle};

/// Value of a single coil or register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum DraftValue {
    /// Coil state
    Coil(bool),
    /// Register value
    Register(u16),
}

/// Values of a multiple coil or register write
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum DraftValues {
    /// Coil states
    Coils(Vec<bool>),
    /// Register values
    Registers(Vec<u16>),
}

/// Request fields that may be preset by a draft entry or supplied when invoking it
///
/// Which fields are required depends on the function code:
///
/// * reads need `start` and `quantity`
/// * single writes need `start` and `value`
/// * multiple writes need `start` and `values`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DraftFields {
    /// Starting address
    pub start: Option<u16>,
    /// Number of coils or registers to read
    pub quantity: Option<u16>,
    /// Value of a single write
    pub value: Option<DraftValue>,
    /// Values of a multiple write
    pub values: Option<DraftValues>,
}

impl DraftFields {
    /// Fields with only a starting address
    pub fn start(start: u16) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    /// Fields of a read
    pub fn read(start: u16, quantity: u16) -> Self {
        Self {
            start: Some(start),
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Set the value of a single write
    pub fn with_value(mut self, value: DraftValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the values of a multiple write
    pub fn with_values(mut self, values: DraftValues) -> Self {
        self.values = Some(values);
        self
    }

    /// Fields of `overrides` win over the ones of `self`
    pub(crate) fn merge(&self, overrides: DraftFields) -> DraftFields {
        DraftFields {
            start: overrides.start.or(self.start),
            quantity: overrides.quantity.or(self.quantity),
            value: overrides.value.or(self.value),
            values: overrides.values.or_else(|| self.values.clone()),
        }
    }
}

/// A named request preset
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DraftEntry {
    /// Function code of the request
    pub code: FunctionCode,
    /// Default fields, possibly incomplete
    #[cfg_attr(feature = "serialization", serde(default))]
    pub preset: DraftFields,
}

impl DraftEntry {
    /// Create an entry
    pub fn new(code: FunctionCode, preset: DraftFields) -> Self {
        Self { code, preset }
    }
}

/// Table of named request presets
///
/// Looked up by [`Master::request`](crate::Master::request). Missing fields of an entry
/// must be supplied as overrides when it is invoked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Draft {
    entries: HashMap<String, DraftEntry>,
}

impl Draft {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, entry: DraftEntry) -> Option<DraftEntry> {
        self.entries.insert(key.into(), entry)
    }

    /// Add an entry, builder style
    pub fn with(mut self, key: impl Into<String>, entry: DraftEntry) -> Self {
        self.insert(key, entry);
        self
    }

    /// Look up an entry
    pub fn get(&self, key: &str) -> Option<&DraftEntry> {
        self.entries.get(key)
    }

    /// Build the request named by `key` with the fields of `overrides` merged in
    pub fn resolve(&self, key: &str, overrides: DraftFields) -> Result<Request, InvalidRequest> {
        let entry = self
            .get(key)
            .ok_or_else(|| InvalidRequest::UnknownDraft(key.to_string()))?;
        Builder {
            key,
            fields: entry.preset.merge(overrides),
        }
        .build(entry.code)
    }
}

struct Builder<'a> {
    key: &'a str,
    fields: DraftFields,
}

impl Builder<'_> {
    fn build(self, code: FunctionCode) -> Result<Request, InvalidRequest> {
        let request = match code {
            FunctionCode::Exception => return Err(self.bad("code")),
            FunctionCode::ReadCoils => Request::ReadCoils(self.range()?),
            FunctionCode::ReadDiscreteInputs => Request::ReadDiscreteInputs(self.range()?),
            FunctionCode::ReadHoldingRegisters => Request::ReadHoldingRegisters(self.range()?),
            FunctionCode::ReadInputRegisters => Request::ReadInputRegisters(self.range()?),
            FunctionCode::WriteSingleCoil => match self.value()? {
                DraftValue::Coil(x) => Request::WriteSingleCoil(WriteSingle::new(self.start()?, x)),
                DraftValue::Register(_) => return Err(self.bad("value")),
            },
            FunctionCode::WriteSingleRegister => match self.value()? {
                DraftValue::Register(x) => {
                    Request::WriteSingleRegister(WriteSingle::new(self.start()?, x))
                }
                DraftValue::Coil(_) => return Err(self.bad("value")),
            },
            FunctionCode::WriteMultipleCoils => match self.values()? {
                DraftValues::Coils(x) => {
                    Request::WriteMultipleCoils(WriteMultiple::new(self.start()?, x.clone()))
                }
                DraftValues::Registers(_) => return Err(self.bad("values")),
            },
            FunctionCode::WriteMultipleRegisters => match self.values()? {
                DraftValues::Registers(x) => {
                    Request::WriteMultipleRegisters(WriteMultiple::new(self.start()?, x.clone()))
                }
                DraftValues::Coils(_) => return Err(self.bad("values")),
            },
        };
        Ok(request)
    }

    fn range(&self) -> Result<ReadRange, InvalidRequest> {
        Ok(ReadRange::new(
            self.start()?,
            self.fields.quantity.ok_or_else(|| self.missing("quantity"))?,
        ))
    }

    fn start(&self) -> Result<u16, InvalidRequest> {
        self.fields.start.ok_or_else(|| self.missing("start"))
    }

    fn value(&self) -> Result<DraftValue, InvalidRequest> {
        self.fields.value.ok_or_else(|| self.missing("value"))
    }

    fn values(&self) -> Result<&DraftValues, InvalidRequest> {
        self.fields.values.as_ref().ok_or_else(|| self.missing("values"))
    }

    fn missing(&self, field: &'static str) -> InvalidRequest {
        InvalidRequest::MissingDraftField(self.key.to_string(), field)
    }

    fn bad(&self, field: &'static str) -> InvalidRequest {
        InvalidRequest::BadDraftField(self.key.to_string(), field)
    }
}
