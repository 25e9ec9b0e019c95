//! Vehicle entity and the static fleet rule tables
//!
//! Every vehicle type maps to an ID prefix (used when generating placeholder
//! fleet entries) and to a default usage category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Vehicle type operated by the waste-collection fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "Chain Arm Roll")]
    ChainArmRoll,
    #[serde(rename = "Compactor")]
    Compactor,
    #[serde(rename = "Dumper (20m3)")]
    Dumper20m3,
    #[serde(rename = "Dumper (5m3)")]
    Dumper5m3,
    #[serde(rename = "Front End Loader")]
    FrontEndLoader,
    #[serde(rename = "Loader Rickshaw")]
    LoaderRickshaw,
    #[serde(rename = "Mechanical Sweeper")]
    MechanicalSweeper,
    #[serde(rename = "Mini Tipper")]
    MiniTipper,
    #[serde(rename = "Tractor Loader")]
    TractorLoader,
    #[serde(rename = "Tractor Trolley")]
    TractorTrolley,
    #[serde(rename = "Water Bowzer")]
    WaterBowzer,
    #[serde(rename = "Gulli Sucker")]
    GulliSucker,
    #[serde(rename = "Drain Cleaner")]
    DrainCleaner,
}

impl VehicleType {
    /// All vehicle types in form order
    pub fn all() -> &'static [VehicleType] {
        &[
            VehicleType::ChainArmRoll,
            VehicleType::Compactor,
            VehicleType::Dumper20m3,
            VehicleType::Dumper5m3,
            VehicleType::FrontEndLoader,
            VehicleType::LoaderRickshaw,
            VehicleType::MechanicalSweeper,
            VehicleType::MiniTipper,
            VehicleType::TractorLoader,
            VehicleType::TractorTrolley,
            VehicleType::WaterBowzer,
            VehicleType::GulliSucker,
            VehicleType::DrainCleaner,
        ]
    }

    /// Label stored in the VEHICLE_TYPE column
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::ChainArmRoll => "Chain Arm Roll",
            VehicleType::Compactor => "Compactor",
            VehicleType::Dumper20m3 => "Dumper (20m3)",
            VehicleType::Dumper5m3 => "Dumper (5m3)",
            VehicleType::FrontEndLoader => "Front End Loader",
            VehicleType::LoaderRickshaw => "Loader Rickshaw",
            VehicleType::MechanicalSweeper => "Mechanical Sweeper",
            VehicleType::MiniTipper => "Mini Tipper",
            VehicleType::TractorLoader => "Tractor Loader",
            VehicleType::TractorTrolley => "Tractor Trolley",
            VehicleType::WaterBowzer => "Water Bowzer",
            VehicleType::GulliSucker => "Gulli Sucker",
            VehicleType::DrainCleaner => "Drain Cleaner",
        }
    }

    /// Shell-friendly name accepted on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            VehicleType::ChainArmRoll => "chain-arm-roll",
            VehicleType::Compactor => "compactor",
            VehicleType::Dumper20m3 => "dumper-20m3",
            VehicleType::Dumper5m3 => "dumper-5m3",
            VehicleType::FrontEndLoader => "front-end-loader",
            VehicleType::LoaderRickshaw => "loader-rickshaw",
            VehicleType::MechanicalSweeper => "mechanical-sweeper",
            VehicleType::MiniTipper => "mini-tipper",
            VehicleType::TractorLoader => "tractor-loader",
            VehicleType::TractorTrolley => "tractor-trolley",
            VehicleType::WaterBowzer => "water-bowzer",
            VehicleType::GulliSucker => "gulli-sucker",
            VehicleType::DrainCleaner => "drain-cleaner",
        }
    }

    /// VEH_ID prefix for generated vehicles
    ///
    /// Both dumper sizes share `D`.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            VehicleType::ChainArmRoll => "AR",
            VehicleType::Compactor => "C",
            VehicleType::Dumper20m3 | VehicleType::Dumper5m3 => "D",
            VehicleType::FrontEndLoader => "FL",
            VehicleType::LoaderRickshaw => "LR",
            VehicleType::MechanicalSweeper => "MS",
            VehicleType::MiniTipper => "MT",
            VehicleType::TractorLoader => "TL",
            VehicleType::TractorTrolley => "TT",
            VehicleType::WaterBowzer => "MW",
            VehicleType::GulliSucker => "GS",
            VehicleType::DrainCleaner => "DC",
        }
    }

    /// Usage category assigned automatically to this type, if any
    pub fn default_usage(&self) -> Option<UsageCategory> {
        match self {
            VehicleType::ChainArmRoll | VehicleType::Compactor => {
                Some(UsageCategory::ContainerBaseCollection)
            }
            VehicleType::Dumper20m3 | VehicleType::Dumper5m3 | VehicleType::FrontEndLoader => {
                Some(UsageCategory::SecondaryWasteCollection)
            }
            VehicleType::LoaderRickshaw => Some(UsageCategory::DoorToDoorResidential),
            VehicleType::MechanicalSweeper => Some(UsageCategory::MechanicalSweeping),
            VehicleType::MiniTipper => Some(UsageCategory::DoorToDoorCommercial),
            VehicleType::TractorLoader | VehicleType::TractorTrolley => {
                Some(UsageCategory::BulkWasteCollection)
            }
            VehicleType::WaterBowzer => Some(UsageCategory::MechanicalWashing),
            VehicleType::GulliSucker => Some(UsageCategory::DumpsiteManagement),
            VehicleType::DrainCleaner => None,
        }
    }

    /// Label of the default usage category, empty when the type has none
    pub fn default_usage_label(&self) -> &'static str {
        self.default_usage().map(|u| u.label()).unwrap_or("")
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleType {
    type Err = UnknownValue;

    /// Accepts the stored label (case-insensitive) or the slug
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        VehicleType::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(wanted) || t.slug() == wanted.to_lowercase())
            .ok_or_else(|| UnknownValue {
                kind: "vehicle type",
                value: s.to_string(),
                expected: VehicleType::all().iter().map(|t| t.slug()).collect(),
            })
    }
}

/// Operational task a vehicle is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageCategory {
    #[serde(rename = "Container Base Collection")]
    ContainerBaseCollection,
    #[serde(rename = "Secondary Waste Collection")]
    SecondaryWasteCollection,
    #[serde(rename = "Bulk Waste Collection")]
    BulkWasteCollection,
    #[serde(rename = "Door to Door (Residential)")]
    DoorToDoorResidential,
    #[serde(rename = "Mechanical Sweeping")]
    MechanicalSweeping,
    #[serde(rename = "Door to Door (Commercial)")]
    DoorToDoorCommercial,
    #[serde(rename = "Mechanical Washing")]
    MechanicalWashing,
    #[serde(rename = "Dumpsite Management")]
    DumpsiteManagement,
}

impl UsageCategory {
    pub fn all() -> &'static [UsageCategory] {
        &[
            UsageCategory::ContainerBaseCollection,
            UsageCategory::SecondaryWasteCollection,
            UsageCategory::BulkWasteCollection,
            UsageCategory::DoorToDoorResidential,
            UsageCategory::MechanicalSweeping,
            UsageCategory::DoorToDoorCommercial,
            UsageCategory::MechanicalWashing,
            UsageCategory::DumpsiteManagement,
        ]
    }

    /// Label stored in the USED_FOR column
    pub fn label(&self) -> &'static str {
        match self {
            UsageCategory::ContainerBaseCollection => "Container Base Collection",
            UsageCategory::SecondaryWasteCollection => "Secondary Waste Collection",
            UsageCategory::BulkWasteCollection => "Bulk Waste Collection",
            UsageCategory::DoorToDoorResidential => "Door to Door (Residential)",
            UsageCategory::MechanicalSweeping => "Mechanical Sweeping",
            UsageCategory::DoorToDoorCommercial => "Door to Door (Commercial)",
            UsageCategory::MechanicalWashing => "Mechanical Washing",
            UsageCategory::DumpsiteManagement => "Dumpsite Management",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            UsageCategory::ContainerBaseCollection => "container-base",
            UsageCategory::SecondaryWasteCollection => "secondary-waste",
            UsageCategory::BulkWasteCollection => "bulk-waste",
            UsageCategory::DoorToDoorResidential => "door-to-door-residential",
            UsageCategory::MechanicalSweeping => "mechanical-sweeping",
            UsageCategory::DoorToDoorCommercial => "door-to-door-commercial",
            UsageCategory::MechanicalWashing => "mechanical-washing",
            UsageCategory::DumpsiteManagement => "dumpsite-management",
        }
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UsageCategory {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        UsageCategory::all()
            .iter()
            .copied()
            .find(|u| u.label().eq_ignore_ascii_case(wanted) || u.slug() == wanted.to_lowercase())
            .ok_or_else(|| UnknownValue {
                kind: "usage category",
                value: s.to_string(),
                expected: UsageCategory::all().iter().map(|u| u.slug()).collect(),
            })
    }
}

/// A label that matches none of the fixed values
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {})", .expected.join(", "))]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
    pub expected: Vec<&'static str>,
}

/// Columns of the vehicles table, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleColumn {
    VehId,
    RegNo,
    VehicleType,
    Make,
    Model,
    Year,
    Owner,
    UsedFor,
}

impl VehicleColumn {
    /// Every user-visible column; also the set an import file must carry
    pub const ALL: [VehicleColumn; 8] = [
        VehicleColumn::VehId,
        VehicleColumn::RegNo,
        VehicleColumn::VehicleType,
        VehicleColumn::Make,
        VehicleColumn::Model,
        VehicleColumn::Year,
        VehicleColumn::Owner,
        VehicleColumn::UsedFor,
    ];

    /// Columns covered by an "all fields" text search
    pub const TEXT: [VehicleColumn; 7] = [
        VehicleColumn::VehId,
        VehicleColumn::RegNo,
        VehicleColumn::VehicleType,
        VehicleColumn::Make,
        VehicleColumn::Model,
        VehicleColumn::Owner,
        VehicleColumn::UsedFor,
    ];

    /// SQL column name, which is also the import/report header
    pub fn name(&self) -> &'static str {
        match self {
            VehicleColumn::VehId => "VEH_ID",
            VehicleColumn::RegNo => "REG_NO",
            VehicleColumn::VehicleType => "VEHICLE_TYPE",
            VehicleColumn::Make => "MAKE",
            VehicleColumn::Model => "MODEL",
            VehicleColumn::Year => "YEAR",
            VehicleColumn::Owner => "OWNER",
            VehicleColumn::UsedFor => "USED_FOR",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for VehicleColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fleet vehicle
///
/// `vehicle_type` and `used_for` are kept as the stored labels because
/// imported rows are written as-is and may carry values outside the fixed
/// tables; see [`VehicleRecord::known_type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "VEH_ID")]
    pub veh_id: String,

    #[serde(rename = "REG_NO")]
    pub reg_no: String,

    #[serde(rename = "VEHICLE_TYPE")]
    pub vehicle_type: String,

    #[serde(rename = "MAKE")]
    pub make: String,

    #[serde(rename = "MODEL")]
    pub model: String,

    /// Model year; empty for imported rows with a blank cell
    #[serde(rename = "YEAR")]
    pub year: Option<i64>,

    #[serde(rename = "OWNER")]
    pub owner: String,

    #[serde(rename = "USED_FOR")]
    pub used_for: String,
}

/// Defaults written into generated placeholder vehicles
pub const PLACEHOLDER_MAKE: &str = "Default Make";
pub const PLACEHOLDER_MODEL: &str = "Default Model";
pub const PLACEHOLDER_OWNER: &str = "Default Owner";
pub const PLACEHOLDER_YEAR: i64 = 2020;

impl VehicleRecord {
    /// Create a record of the given type with blank free-text fields
    pub fn new(veh_id: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            veh_id: veh_id.into(),
            reg_no: String::new(),
            vehicle_type: vehicle_type.label().to_string(),
            make: String::new(),
            model: String::new(),
            year: Some(PLACEHOLDER_YEAR),
            owner: String::new(),
            used_for: vehicle_type.default_usage_label().to_string(),
        }
    }

    /// Placeholder vehicle number `n` of a type: `C3`, `Compactor REG 3`, ...
    pub fn placeholder(vehicle_type: VehicleType, n: u64) -> Self {
        Self {
            veh_id: format!("{}{}", vehicle_type.id_prefix(), n),
            reg_no: format!("{} REG {}", vehicle_type.label(), n),
            vehicle_type: vehicle_type.label().to_string(),
            make: PLACEHOLDER_MAKE.to_string(),
            model: PLACEHOLDER_MODEL.to_string(),
            year: Some(PLACEHOLDER_YEAR),
            owner: PLACEHOLDER_OWNER.to_string(),
            used_for: vehicle_type.default_usage_label().to_string(),
        }
    }

    /// The vehicle type, if the stored label is one of the fixed values
    pub fn known_type(&self) -> Option<VehicleType> {
        self.vehicle_type.parse().ok()
    }

    /// The usage category, if the stored label is one of the fixed values
    pub fn known_usage(&self) -> Option<UsageCategory> {
        self.used_for.parse().ok()
    }

    /// Display value of a column
    pub fn value(&self, column: VehicleColumn) -> String {
        match column {
            VehicleColumn::VehId => self.veh_id.clone(),
            VehicleColumn::RegNo => self.reg_no.clone(),
            VehicleColumn::VehicleType => self.vehicle_type.clone(),
            VehicleColumn::Make => self.make.clone(),
            VehicleColumn::Model => self.model.clone(),
            VehicleColumn::Year => self.year.map(|y| y.to_string()).unwrap_or_default(),
            VehicleColumn::Owner => self.owner.clone(),
            VehicleColumn::UsedFor => self.used_for.clone(),
        }
    }
}

/// A record together with its internal storage key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredVehicle {
    /// Auto-assigned row key; never shown in listings
    #[serde(skip)]
    pub key: i64,

    #[serde(flatten)]
    pub record: VehicleRecord,
}

/// Field changes applied by an edit; VEH_ID is deliberately absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    pub reg_no: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub owner: Option<String>,
    pub used_for: Option<UsageCategory>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        *self == VehiclePatch::default()
    }

    /// Overwrite every field set in the patch
    pub fn apply(&self, record: &mut VehicleRecord) {
        if let Some(ref reg_no) = self.reg_no {
            record.reg_no = reg_no.clone();
        }
        if let Some(vehicle_type) = self.vehicle_type {
            record.vehicle_type = vehicle_type.label().to_string();
        }
        if let Some(ref make) = self.make {
            record.make = make.clone();
        }
        if let Some(ref model) = self.model {
            record.model = model.clone();
        }
        if let Some(year) = self.year {
            record.year = Some(year);
        }
        if let Some(ref owner) = self.owner {
            record.owner = owner.clone();
        }
        if let Some(used_for) = self.used_for {
            record.used_for = used_for.label().to_string();
        }
    }
}
