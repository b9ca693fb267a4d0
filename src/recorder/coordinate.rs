use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_SPINDLE: u8 = 1;
pub const MAX_SPINDLE: u8 = 84;
pub const MIN_COLUMN: u16 = 1;
pub const MAX_COLUMN: u16 = 120;

/// Creel side of a weaving measurement point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    AI,
    BI,
    AO,
    BO,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::AI, Side::BI, Side::AO, Side::BO];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::AI => "AI",
            Side::BI => "BI",
            Side::AO => "AO",
            Side::BO => "BO",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn previous(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl Default for Side {
    fn default() -> Self {
        Side::AI
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creel row of a weaving measurement point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Row {
    A,
    B,
    C,
    D,
    E,
}

impl Row {
    pub const ALL: [Row; 5] = [Row::A, Row::B, Row::C, Row::D, Row::E];

    pub fn as_str(&self) -> &'static str {
        match self {
            Row::A => "A",
            Row::B => "B",
            Row::C => "C",
            Row::D => "D",
            Row::E => "E",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn previous(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl Default for Row {
    fn default() -> Self {
        Row::A
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let index = all.iter().position(|item| *item == current).unwrap_or(0);
    all[(index + step) % all.len()]
}

/// A single point on the weaving creel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub struct WeavingPosition {
    pub side: Side,
    pub row: Row,
    pub column: u16,
}

impl WeavingPosition {
    pub fn new(side: Side, row: Row, column: u16) -> Self {
        Self { side, row, column }
    }
}

impl fmt::Display for WeavingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}{}", self.side, self.row, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_cycles_with_wraparound() {
        assert_eq!(Side::AI.next(), Side::BI);
        assert_eq!(Side::BO.next(), Side::AI);
        assert_eq!(Side::AI.previous(), Side::BO);
    }

    #[test]
    fn row_cycles_with_wraparound() {
        assert_eq!(Row::E.next(), Row::A);
        assert_eq!(Row::A.previous(), Row::E);
        assert_eq!(Row::C.previous(), Row::B);
    }

    #[test]
    fn position_label_reads_side_row_column() {
        let position = WeavingPosition::new(Side::AO, Row::D, 17);
        assert_eq!(position.to_string(), "AO-D17");
    }
}
