use std::fmt::Debug;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::coordinate::{
    Row, Side, WeavingPosition, MAX_COLUMN, MAX_SPINDLE, MIN_COLUMN, MIN_SPINDLE,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Max,
    Min,
}

impl ValueType {
    pub fn toggled(self) -> Self {
        match self {
            ValueType::Max => ValueType::Min,
            ValueType::Min => ValueType::Max,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Max => "Max",
            ValueType::Min => "Min",
        }
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("Column must be between 1 and 120 (got {0})")]
    ColumnOutOfRange(i64),
    #[error("Spindle must be between 1 and 84 (got {0})")]
    SpindleOutOfRange(i64),
}

/// Current measurement coordinate plus the pending value type within it.
pub trait PositionCursor:
    Clone + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Coordinate: Copy + Debug + Send + Sync;
    type Move: Debug + DeserializeOwned + Send;

    fn coordinate(&self) -> Self::Coordinate;

    fn value_type(&self) -> ValueType;

    fn set_value_type(&mut self, value_type: ValueType);

    fn toggle_value_type(&mut self) {
        let next = self.value_type().toggled();
        self.set_value_type(next);
    }

    /// Applies a navigation step. On error the cursor is left untouched.
    fn apply(&mut self, movement: Self::Move) -> Result<(), CursorError>;

    /// Runs after a value has been stored at the current coordinate.
    /// `pair_completed` is true when the sibling value was already present
    /// before the write.
    fn after_submit(&mut self, pair_completed: bool);

    /// Human readable position, used as the subject of problem reports.
    fn label(&self) -> String;

    /// Pulls a cursor decoded from storage back inside the creel bounds.
    fn normalize(&mut self);
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum TwistingMove {
    Next,
    Previous,
    JumpTo(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TwistingCursor {
    pub spindle_number: u8,
    pub value_type: ValueType,
}

impl Default for TwistingCursor {
    fn default() -> Self {
        Self {
            spindle_number: MIN_SPINDLE,
            value_type: ValueType::Max,
        }
    }
}

impl PositionCursor for TwistingCursor {
    type Coordinate = u8;
    type Move = TwistingMove;

    fn coordinate(&self) -> u8 {
        self.spindle_number
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn set_value_type(&mut self, value_type: ValueType) {
        self.value_type = value_type;
    }

    fn apply(&mut self, movement: TwistingMove) -> Result<(), CursorError> {
        match movement {
            TwistingMove::Next => {
                self.spindle_number = self.spindle_number.saturating_add(1).min(MAX_SPINDLE);
            }
            TwistingMove::Previous => {
                self.spindle_number = self.spindle_number.saturating_sub(1).max(MIN_SPINDLE);
            }
            TwistingMove::JumpTo(target) => {
                if target < i64::from(MIN_SPINDLE) || target > i64::from(MAX_SPINDLE) {
                    return Err(CursorError::SpindleOutOfRange(target));
                }
                self.spindle_number = target as u8;
            }
        }
        Ok(())
    }

    fn after_submit(&mut self, _pair_completed: bool) {
        self.toggle_value_type();
    }

    fn label(&self) -> String {
        format!("Spindle {}", self.spindle_number)
    }

    fn normalize(&mut self) {
        self.spindle_number = self.spindle_number.clamp(MIN_SPINDLE, MAX_SPINDLE);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum WeavingMove {
    NextSide,
    PreviousSide,
    NextRow,
    PreviousRow,
    NextColumn,
    PreviousColumn,
    JumpToColumn(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeavingCursor {
    pub side: Side,
    pub row: Row,
    pub column: u16,
    pub value_type: ValueType,
}

impl Default for WeavingCursor {
    fn default() -> Self {
        Self {
            side: Side::AI,
            row: Row::A,
            column: MIN_COLUMN,
            value_type: ValueType::Max,
        }
    }
}

impl WeavingCursor {
    fn advance_column(&mut self) {
        self.column = self.column.saturating_add(1).min(MAX_COLUMN);
    }
}

impl PositionCursor for WeavingCursor {
    type Coordinate = WeavingPosition;
    type Move = WeavingMove;

    fn coordinate(&self) -> WeavingPosition {
        WeavingPosition::new(self.side, self.row, self.column)
    }

    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn set_value_type(&mut self, value_type: ValueType) {
        self.value_type = value_type;
    }

    fn apply(&mut self, movement: WeavingMove) -> Result<(), CursorError> {
        match movement {
            WeavingMove::NextSide => self.side = self.side.next(),
            WeavingMove::PreviousSide => self.side = self.side.previous(),
            WeavingMove::NextRow => self.row = self.row.next(),
            WeavingMove::PreviousRow => self.row = self.row.previous(),
            WeavingMove::NextColumn => self.advance_column(),
            WeavingMove::PreviousColumn => {
                self.column = self.column.saturating_sub(1).max(MIN_COLUMN);
            }
            WeavingMove::JumpToColumn(target) => {
                if target < i64::from(MIN_COLUMN) || target > i64::from(MAX_COLUMN) {
                    return Err(CursorError::ColumnOutOfRange(target));
                }
                self.column = target as u16;
            }
        }
        Ok(())
    }

    fn after_submit(&mut self, pair_completed: bool) {
        if pair_completed {
            self.advance_column();
            self.value_type = ValueType::Max;
        } else {
            self.toggle_value_type();
        }
    }

    fn label(&self) -> String {
        self.coordinate().to_string()
    }

    fn normalize(&mut self) {
        self.column = self.column.clamp(MIN_COLUMN, MAX_COLUMN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twisting_cursor_saturates_at_bounds() {
        let mut cursor = TwistingCursor::default();
        cursor.apply(TwistingMove::Previous).unwrap();
        assert_eq!(cursor.spindle_number, 1);

        cursor.apply(TwistingMove::JumpTo(84)).unwrap();
        cursor.apply(TwistingMove::Next).unwrap();
        assert_eq!(cursor.spindle_number, 84);
    }

    #[test]
    fn twisting_jump_rejects_out_of_range() {
        let mut cursor = TwistingCursor::default();
        cursor.apply(TwistingMove::JumpTo(12)).unwrap();

        assert_eq!(
            cursor.apply(TwistingMove::JumpTo(85)),
            Err(CursorError::SpindleOutOfRange(85))
        );
        assert_eq!(
            cursor.apply(TwistingMove::JumpTo(0)),
            Err(CursorError::SpindleOutOfRange(0))
        );
        assert_eq!(cursor.spindle_number, 12);
    }

    #[test]
    fn twisting_submit_only_toggles() {
        let mut cursor = TwistingCursor::default();
        cursor.after_submit(false);
        assert_eq!(cursor.value_type, ValueType::Min);
        cursor.after_submit(true);
        assert_eq!(cursor.value_type, ValueType::Max);
        assert_eq!(cursor.spindle_number, 1);
    }

    #[test]
    fn weaving_column_saturates_at_bounds() {
        let mut cursor = WeavingCursor::default();
        cursor.apply(WeavingMove::PreviousColumn).unwrap();
        assert_eq!(cursor.column, 1);

        cursor.apply(WeavingMove::JumpToColumn(120)).unwrap();
        cursor.apply(WeavingMove::NextColumn).unwrap();
        assert_eq!(cursor.column, 120);
    }

    #[test]
    fn weaving_jump_validates_column() {
        let mut cursor = WeavingCursor::default();
        cursor.apply(WeavingMove::JumpToColumn(40)).unwrap();

        for bad in [0, 121] {
            let err = cursor.apply(WeavingMove::JumpToColumn(bad)).unwrap_err();
            assert_eq!(err, CursorError::ColumnOutOfRange(bad));
            assert_eq!(cursor.column, 40);
        }

        cursor.apply(WeavingMove::JumpToColumn(1)).unwrap();
        assert_eq!(cursor.column, 1);
        cursor.apply(WeavingMove::JumpToColumn(120)).unwrap();
        assert_eq!(cursor.column, 120);
    }

    #[test]
    fn weaving_side_and_row_wrap() {
        let mut cursor = WeavingCursor::default();
        cursor.apply(WeavingMove::PreviousSide).unwrap();
        cursor.apply(WeavingMove::PreviousRow).unwrap();
        assert_eq!(cursor.side, Side::BO);
        assert_eq!(cursor.row, Row::E);
    }

    #[test]
    fn weaving_after_submit_advances_only_when_pair_completes() {
        let mut cursor = WeavingCursor::default();
        cursor.after_submit(false);
        assert_eq!(cursor.column, 1);
        assert_eq!(cursor.value_type, ValueType::Min);

        cursor.after_submit(true);
        assert_eq!(cursor.column, 2);
        assert_eq!(cursor.value_type, ValueType::Max);
    }

    #[test]
    fn normalize_clamps_decoded_positions() {
        let mut cursor: WeavingCursor = serde_json::from_str(
            r#"{"side":"BI","row":"C","column":400,"valueType":"min"}"#,
        )
        .unwrap();
        cursor.normalize();
        assert_eq!(cursor.column, 120);

        let mut cursor = TwistingCursor {
            spindle_number: 0,
            value_type: ValueType::Max,
        };
        cursor.normalize();
        assert_eq!(cursor.spindle_number, 1);
    }

    #[test]
    fn move_payloads_decode_from_frontend_shape() {
        let movement: WeavingMove =
            serde_json::from_str(r#"{"type":"jumpToColumn","value":33}"#).unwrap();
        assert_eq!(movement, WeavingMove::JumpToColumn(33));

        let movement: TwistingMove = serde_json::from_str(r#"{"type":"next"}"#).unwrap();
        assert_eq!(movement, TwistingMove::Next);
    }
}
