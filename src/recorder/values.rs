use std::{collections::BTreeMap, fmt::Debug};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::coordinate::{Row, Side, WeavingPosition};
use super::cursor::ValueType;
use crate::models::SessionParameters;

/// Max/min reading pair for one coordinate. Both start empty.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MeasurementPair {
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl MeasurementPair {
    pub fn get(&self, value_type: ValueType) -> Option<f64> {
        match value_type {
            ValueType::Max => self.max,
            ValueType::Min => self.min,
        }
    }

    pub fn set(&mut self, value_type: ValueType, value: Option<f64>) {
        match value_type {
            ValueType::Max => self.max = value,
            ValueType::Min => self.min = value,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.max.is_some() && self.min.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.max.is_none() && self.min.is_none()
    }
}

/// Coordinate → pair mapping, owned by a recording session.
pub trait MeasurementStore:
    Clone + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Coordinate: Copy;

    fn pair(&self, at: Self::Coordinate) -> MeasurementPair;

    /// Mutable access to the pair at `at`, creating every level on the way.
    fn pair_mut(&mut self, at: Self::Coordinate) -> &mut MeasurementPair;

    /// Number of coordinates holding at least one reading.
    fn filled(&self) -> usize;

    fn get(&self, at: Self::Coordinate, value_type: ValueType) -> Option<f64> {
        self.pair(at).get(value_type)
    }

    fn set(&mut self, at: Self::Coordinate, value_type: ValueType, value: Option<f64>) {
        self.pair_mut(at).set(value_type, value);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TwistingValues {
    spindles: BTreeMap<u8, MeasurementPair>,
}

impl MeasurementStore for TwistingValues {
    type Coordinate = u8;

    fn pair(&self, at: u8) -> MeasurementPair {
        self.spindles.get(&at).copied().unwrap_or_default()
    }

    fn pair_mut(&mut self, at: u8) -> &mut MeasurementPair {
        self.spindles.entry(at).or_default()
    }

    fn filled(&self) -> usize {
        self.spindles.values().filter(|pair| !pair.is_empty()).count()
    }
}

type ColumnMap = BTreeMap<u16, MeasurementPair>;

/// Side → row → column readings for the weaving creel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WeavingValues {
    sides: BTreeMap<Side, BTreeMap<Row, ColumnMap>>,
}

impl WeavingValues {
    pub fn columns(&self, side: Side, row: Row) -> Option<&ColumnMap> {
        self.sides.get(&side).and_then(|rows| rows.get(&row))
    }
}

impl MeasurementStore for WeavingValues {
    type Coordinate = WeavingPosition;

    fn pair(&self, at: WeavingPosition) -> MeasurementPair {
        self.columns(at.side, at.row)
            .and_then(|columns| columns.get(&at.column))
            .copied()
            .unwrap_or_default()
    }

    fn pair_mut(&mut self, at: WeavingPosition) -> &mut MeasurementPair {
        self.sides
            .entry(at.side)
            .or_default()
            .entry(at.row)
            .or_default()
            .entry(at.column)
            .or_default()
    }

    fn filled(&self) -> usize {
        self.sides
            .values()
            .flat_map(|rows| rows.values())
            .flat_map(|columns| columns.values())
            .filter(|pair| !pair.is_empty())
            .count()
    }
}

pub const SPEC_TENSION_KEY: &str = "specTension";
pub const TOLERANCE_KEY: &str = "tolerance";

/// Inclusive acceptance window derived from the session's spec tension and
/// tolerance. Purely presentational; storage never consults it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecRange {
    pub lower: f64,
    pub upper: f64,
}

impl SpecRange {
    pub fn new(spec_tension: f64, tolerance: f64) -> Self {
        Self {
            lower: spec_tension - tolerance,
            upper: spec_tension + tolerance,
        }
    }

    pub fn from_parameters(parameters: &SessionParameters) -> Self {
        let read = |key: &str| parameters.number(key).unwrap_or(0.0);
        Self::new(read(SPEC_TENSION_KEY), read(TOLERANCE_KEY))
    }

    /// Missing readings are never flagged.
    pub fn contains(&self, value: Option<f64>) -> bool {
        match value {
            Some(value) => value >= self.lower && value <= self.upper,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PairSpecStatus {
    pub max_in_spec: bool,
    pub min_in_spec: bool,
}

impl PairSpecStatus {
    pub fn evaluate(range: &SpecRange, pair: &MeasurementPair) -> Self {
        Self {
            max_in_spec: range.contains(pair.max),
            min_in_spec: range.contains(pair.min),
        }
    }
}
