use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use thiserror::Error;

/// Validation errors raised when constructing or mutating domain values.
///
/// These are always raised at the point of construction, never deferred to
/// the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("habit text cannot be empty")]
    EmptyHabitText,
    #[error("column must be between 0 and 8")]
    ColumnOutOfRange,
    #[error("row must be between 0 and 8")]
    RowOutOfRange,
    #[error("number must be between 0 and 9")]
    NumberOutOfRange,
    #[error("cell is locked as a given clue")]
    LockedCell,
}

/// How often a habit is meant to be completed.
///
/// The ordinal values 0/1/2 are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Maps a wire ordinal to a frequency. Unrecognized ordinals decode as
    /// `Daily`.
    pub fn from_ordinal(ordinal: i64) -> Self {
        match ordinal {
            1 => Frequency::Weekly,
            2 => Frequency::Monthly,
            _ => Frequency::Daily,
        }
    }

    /// The wire ordinal for this frequency.
    pub fn ordinal(&self) -> u8 {
        match self {
            Frequency::Daily => 0,
            Frequency::Weekly => 1,
            Frequency::Monthly => 2,
        }
    }
}

/// A single tracked habit.
///
/// A habit created locally has no id until the server assigns one; habits
/// reconstructed from a server reply carry their id. Completion always
/// starts out false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    text: String,
    frequency: Frequency,
    complete: bool,
    id: Option<i64>,
}

impl Habit {
    /// Create a new habit with the given display text and frequency.
    ///
    /// Fails with [`ModelError::EmptyHabitText`] if the text is empty.
    pub fn new(text: impl Into<String>, frequency: Frequency) -> Result<Self, ModelError> {
        let text = text.into();
        if text.is_empty() {
            return Err(ModelError::EmptyHabitText);
        }
        Ok(Self {
            text,
            frequency,
            complete: false,
            id: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the display text. The same validation as construction applies.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), ModelError> {
        let text = text.into();
        if text.is_empty() {
            return Err(ModelError::EmptyHabitText);
        }
        self.text = text;
        Ok(())
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: Frequency) {
        self.frequency = frequency;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// The server-assigned id, if this habit has been synced.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl fmt::Display for Habit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Result code attached to every mutating or authentication reply.
///
/// `Okay` is the only success value; anything else is an application-level
/// rejection the caller is expected to branch on. Codes the client does not
/// know about are preserved in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCode {
    Okay,
    MissingRequestType,
    UnsupportedRequestType,
    MissingFields,
    Other(i64),
}

impl SuccessCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => SuccessCode::Okay,
            10 => SuccessCode::MissingRequestType,
            11 => SuccessCode::UnsupportedRequestType,
            12 => SuccessCode::MissingFields,
            other => SuccessCode::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            SuccessCode::Okay => 0,
            SuccessCode::MissingRequestType => 10,
            SuccessCode::UnsupportedRequestType => 11,
            SuccessCode::MissingFields => 12,
            SuccessCode::Other(code) => *code,
        }
    }

    pub fn is_okay(&self) -> bool {
        matches!(self, SuccessCode::Okay)
    }
}

// The server transmits success codes as numbers (often floats); some older
// builds sent numeric strings. Accept all three.
impl<'de> Deserialize<'de> for SuccessCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CodeVisitor;

        impl Visitor<'_> for CodeVisitor {
            type Value = SuccessCode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a numeric success code")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(SuccessCode::from_code(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(SuccessCode::from_code)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(SuccessCode::from_code(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.trim()
                    .parse::<i64>()
                    .or_else(|_| v.trim().parse::<f64>().map(|f| f as i64))
                    .map(SuccessCode::from_code)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(CodeVisitor)
    }
}

/// A 9x9 sudoku grid paired with its lock mask.
///
/// Numbers use 0 for an empty cell and 1-9 for filled cells. A locked cell
/// is a given clue; its number is never altered after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudokuPuzzle {
    numbers: [[u8; Self::SIZE]; Self::SIZE],
    locks: [[bool; Self::SIZE]; Self::SIZE],
}

impl SudokuPuzzle {
    /// Grid dimension along both axes.
    pub const SIZE: usize = 9;

    pub fn new(
        numbers: [[u8; Self::SIZE]; Self::SIZE],
        locks: [[bool; Self::SIZE]; Self::SIZE],
    ) -> Self {
        Self { numbers, locks }
    }

    /// The number at the given cell, or `None` out of range.
    pub fn number(&self, row: usize, col: usize) -> Option<u8> {
        self.numbers.get(row)?.get(col).copied()
    }

    /// Whether the given cell is a fixed clue, or `None` out of range.
    pub fn is_locked(&self, row: usize, col: usize) -> Option<bool> {
        self.locks.get(row)?.get(col).copied()
    }

    /// Write a number into an unlocked cell.
    pub fn set_number(&mut self, row: usize, col: usize, number: u8) -> Result<(), ModelError> {
        if row >= Self::SIZE {
            return Err(ModelError::RowOutOfRange);
        }
        if col >= Self::SIZE {
            return Err(ModelError::ColumnOutOfRange);
        }
        if number > 9 {
            return Err(ModelError::NumberOutOfRange);
        }
        if self.locks[row][col] {
            return Err(ModelError::LockedCell);
        }
        self.numbers[row][col] = number;
        Ok(())
    }

    pub fn numbers(&self) -> &[[u8; Self::SIZE]; Self::SIZE] {
        &self.numbers
    }

    pub fn locks(&self) -> &[[bool; Self::SIZE]; Self::SIZE] {
        &self.locks
    }
}

/// A single cell mutation, recorded locally to support undo.
///
/// Never travels over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SudokuMove {
    column: usize,
    row: usize,
    prev_number: u8,
}

impl SudokuMove {
    /// Record a move. Coordinates must be within the grid and the previous
    /// number within 0-9; anything else fails immediately.
    pub fn new(column: usize, row: usize, prev_number: u8) -> Result<Self, ModelError> {
        if column > 8 {
            return Err(ModelError::ColumnOutOfRange);
        }
        if row > 8 {
            return Err(ModelError::RowOutOfRange);
        }
        if prev_number > 9 {
            return Err(ModelError::NumberOutOfRange);
        }
        Ok(Self {
            column,
            row,
            prev_number,
        })
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn prev_number(&self) -> u8 {
        self.prev_number
    }
}

/// Result of buying a hint: the revealed cell and the coin balance after
/// the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub number: i64,
    pub row: i64,
    pub col: i64,
    pub coins: i64,
}
