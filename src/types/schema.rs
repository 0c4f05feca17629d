//! Variable descriptor table

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VariableType;
use crate::{ParseError, Result};

/// Description of one channel inside a sample record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDescriptor {
    /// Variable name as defined by iRacing
    pub name: String,
    pub var_type: VariableType,
    /// Byte offset within a sample record
    pub offset: usize,
    /// Number of elements (1 for scalar, >1 for arrays)
    pub count: usize,
    /// Whether the simulator treats the sample count as elapsed time
    pub count_as_time: bool,
    /// Units of measurement (e.g., "m/s", "C", "%")
    pub unit: String,
    pub description: String,
}

impl VarDescriptor {
    /// Bytes occupied in a record.
    pub fn byte_len(&self) -> usize {
        self.var_type.size().saturating_mul(self.count)
    }

    /// First byte past this channel.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.byte_len())
    }
}

/// Name to descriptor lookup built once per file.
///
/// Keeps the declaration order of the file's var table; when a name is declared twice the first
/// declaration wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VarTable {
    descriptors: Vec<VarDescriptor>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
    /// Size of one sample record in bytes
    stride: usize,
}

impl VarTable {
    pub fn new(stride: usize) -> Self {
        Self { descriptors: Vec::new(), by_name: HashMap::new(), stride }
    }

    /// Build a table from descriptors, validating each against the stride.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = VarDescriptor>,
        stride: usize,
    ) -> Result<Self> {
        let mut table = Self::new(stride);
        for descriptor in descriptors {
            table.insert(descriptor)?;
        }
        Ok(table)
    }

    /// Add a descriptor. Returns `Ok(false)` when the name is already taken.
    ///
    /// A descriptor that does not fit inside the record stride is a structural error.
    pub fn insert(&mut self, descriptor: VarDescriptor) -> Result<bool> {
        if descriptor.count == 0 || descriptor.end() > self.stride {
            return Err(ParseError::malformed_header(format!(
                "variable '{}' occupies bytes {}..{} but records are {} bytes",
                descriptor.name,
                descriptor.offset,
                descriptor.end(),
                self.stride
            )));
        }
        if self.by_name.contains_key(&descriptor.name) {
            return Ok(false);
        }
        self.by_name.insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(true)
    }

    /// Get a descriptor by name (O(1) lookup).
    pub fn get(&self, name: &str) -> Option<&VarDescriptor> {
        match self.by_name.get(name) {
            Some(&index) => self.descriptors.get(index),
            // Tables restored through serde have no index yet.
            None if self.by_name.is_empty() => self.descriptors.iter().find(|d| d.name == name),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &VarDescriptor> {
        self.descriptors.iter()
    }

    /// Channel names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}
