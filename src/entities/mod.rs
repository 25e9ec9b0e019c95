//! Entity type definitions
//!
//! - [`VehicleRecord`] - a fleet vehicle as stored
//! - [`VehicleType`] / [`UsageCategory`] - the fixed rule tables
//! - [`VehiclePatch`] - field changes applied by an edit

pub mod vehicle;

pub use vehicle::{
    StoredVehicle, UsageCategory, VehicleColumn, VehiclePatch, VehicleRecord, VehicleType,
};
