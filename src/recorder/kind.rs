use std::fmt::Debug;

use super::coordinate::{Row, Side, WeavingPosition, MAX_COLUMN, MAX_SPINDLE, MIN_COLUMN, MIN_SPINDLE};
use super::cursor::{PositionCursor, TwistingCursor, WeavingCursor};
use super::values::{MeasurementPair, MeasurementStore, TwistingValues, WeavingValues};

/// Binds a record type to its cursor, value store, storage namespace and
/// export layout.
pub trait RecordKind: Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Prefix for every durable storage key of this record type.
    const NAMESPACE: &'static str;
    const TITLE: &'static str;

    type Coordinate: Copy + Debug + Send + Sync;
    type Cursor: PositionCursor<Coordinate = Self::Coordinate>;
    type Values: MeasurementStore<Coordinate = Self::Coordinate>;

    fn data_header() -> Vec<String>;

    /// One row per structural position, in canonical order, whether or not
    /// anything was recorded there.
    fn data_rows(values: &Self::Values) -> Vec<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Twisting;

#[derive(Debug, Clone, Copy, Default)]
pub struct Weaving;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn push_pair(row: &mut Vec<String>, pair: MeasurementPair) {
    row.push(cell(pair.max));
    row.push(cell(pair.min));
}

impl RecordKind for Twisting {
    const NAMESPACE: &'static str = "twisting";
    const TITLE: &'static str = "Twisting Tension Record";

    type Coordinate = u8;
    type Cursor = TwistingCursor;
    type Values = TwistingValues;

    fn data_header() -> Vec<String> {
        vec!["Spindle".into(), "Max".into(), "Min".into()]
    }

    fn data_rows(values: &TwistingValues) -> Vec<Vec<String>> {
        (MIN_SPINDLE..=MAX_SPINDLE)
            .map(|spindle| {
                let mut row = vec![spindle.to_string()];
                push_pair(&mut row, values.pair(spindle));
                row
            })
            .collect()
    }
}

impl RecordKind for Weaving {
    const NAMESPACE: &'static str = "weaving";
    const TITLE: &'static str = "Weaving Tension Record";

    type Coordinate = WeavingPosition;
    type Cursor = WeavingCursor;
    type Values = WeavingValues;

    fn data_header() -> Vec<String> {
        let mut header = vec!["Column".to_string()];
        for side in Side::ALL {
            for row in Row::ALL {
                header.push(format!("{side}-{row} Max"));
                header.push(format!("{side}-{row} Min"));
            }
        }
        header
    }

    fn data_rows(values: &WeavingValues) -> Vec<Vec<String>> {
        (MIN_COLUMN..=MAX_COLUMN)
            .map(|column| {
                let mut cells = vec![column.to_string()];
                for side in Side::ALL {
                    for row in Row::ALL {
                        push_pair(&mut cells, values.pair(WeavingPosition::new(side, row, column)));
                    }
                }
                cells
            })
            .collect()
    }
}
