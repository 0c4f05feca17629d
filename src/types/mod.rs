//! Core types for telemetry data representation.
//!
//! The type system maps directly to iRacing SDK structures:
//! - [`VariableType`] maps to iRacing's `irsdk_VarType` enum with size information
//! - [`VarDescriptor`] and [`VarTable`] describe where each channel lives in a sample record
//! - [`Value`] holds one decoded channel value
//! - [`BitField`] handles iRacing's bitfield variables
//! - [`TrackSurface`] classifies `PlayerTrackSurface`
//!
//! ```rust
//! use stint::types::{VarDescriptor, VarTable, Value, VariableType, decode_value};
//!
//! let table = VarTable::from_descriptors(
//!     vec![VarDescriptor {
//!         name: "RPM".to_string(),
//!         var_type: VariableType::Float32,
//!         offset: 0,
//!         count: 1,
//!         count_as_time: false,
//!         unit: "revs/min".to_string(),
//!         description: "Engine rpm".to_string(),
//!     }],
//!     4,
//! )
//! .unwrap();
//!
//! let record = 4500.0f32.to_le_bytes();
//! let rpm = decode_value(&record, table.get("RPM").unwrap()).unwrap();
//! assert_eq!(rpm, Value::Float(4500.0));
//! ```

mod bitfield;
mod schema;
mod track_surface;
mod var_data;
mod variable_type;

pub use bitfield::BitField;
pub use schema::{VarDescriptor, VarTable};
pub use track_surface::TrackSurface;
pub use var_data::decode_value;
pub use variable_type::{Value, VariableType};
