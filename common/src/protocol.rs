//! Typed request and reply shapes for the habitdoku wire protocol.
//!
//! Every request carries a `request_type` discriminator; replies are
//! operation-specific. Numeric reply fields may arrive as floating-point
//! values and are narrowed to integers by truncation.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Frequency, Habit, SuccessCode, SudokuPuzzle};

/// Errors for replies that decoded as JSON but do not fit the protocol
/// schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolShapeError {
    #[error("habit record has an empty name")]
    EmptyHabitName,
    #[error("sudoku grids must be 9x9 with matching dimensions")]
    GridShape,
    #[error("sudoku cell value {0} is out of range")]
    CellOutOfRange(i64),
}

/// One request envelope. The variant name, in snake_case, is the wire
/// `request_type` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "request_type", rename_all = "snake_case")]
pub enum Request {
    RegisterUser {
        username: String,
        password: String,
        email: String,
    },
    Login {
        username: String,
        password: String,
    },
    AddHabit {
        authentication_token: String,
        habit_name: String,
        habit_frequency: u8,
    },
    RemoveHabit {
        authentication_token: String,
        habit_id: i64,
    },
    ModifyHabit {
        authentication_token: String,
        habit_name: String,
        habit_frequency: u8,
        habit_id: i64,
    },
    CompleteHabits {
        authentication_token: String,
        habit_ids: Vec<i64>,
    },
    RetrieveData {
        authentication_token: String,
        fields: Vec<Resource>,
    },
    GenerateSudokuPuzzle {
        authentication_token: String,
    },
    UpdateSudokuPuzzle {
        authentication_token: String,
        numbers: [[u8; 9]; 9],
    },
    BuyHint {
        authentication_token: String,
    },
}

/// Selector for `retrieve_data`. One logical resource is retrieved per
/// call, but the wire field is a list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Coins,
    Habits,
    SudokuPuzzle,
}

/// Reply to a mutating operation: a success code, plus a coin balance when
/// the operation awards coins.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub success_code: SuccessCode,
    #[serde(default, deserialize_with = "opt_int")]
    pub coins: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Reply to `login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    pub success_code: SuccessCode,
    #[serde(default)]
    pub authentication_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Reply to `retrieve_data` and `generate_sudoku_puzzle`: the requested
/// resources keyed by name, each absent unless it was selected.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveReply {
    #[serde(default)]
    pub success_code: Option<SuccessCode>,
    #[serde(default, deserialize_with = "opt_int")]
    pub coins: Option<i64>,
    #[serde(default)]
    pub habits: Option<Vec<HabitRecord>>,
    #[serde(default)]
    pub sudoku_puzzle: Option<PuzzlePayload>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Reply to `buy_hint`.
#[derive(Debug, Clone, Deserialize)]
pub struct HintReply {
    #[serde(default)]
    pub success_code: Option<SuccessCode>,
    #[serde(default, deserialize_with = "opt_int")]
    pub number: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub row: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub col: Option<i64>,
    #[serde(default, deserialize_with = "opt_int")]
    pub coins: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One habit record inside a `habits` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct HabitRecord {
    pub name: String,
    #[serde(deserialize_with = "frequency_ordinal")]
    pub frequency: Frequency,
    #[serde(deserialize_with = "int")]
    pub id: i64,
    pub is_complete: bool,
}

impl TryFrom<HabitRecord> for Habit {
    type Error = ProtocolShapeError;

    /// Reconstruct a habit from its server record. The id and completion
    /// flag are assigned after construction; the constructor always starts
    /// a habit incomplete.
    fn try_from(record: HabitRecord) -> Result<Self, Self::Error> {
        let mut habit = Habit::new(record.name, record.frequency)
            .map_err(|_| ProtocolShapeError::EmptyHabitName)?;
        habit.set_id(record.id);
        habit.set_complete(record.is_complete);
        Ok(habit)
    }
}

/// The raw `sudoku_puzzle` reply payload: a number grid and a parallel
/// lock grid, both nested sequences on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzlePayload {
    pub numbers: Vec<Vec<f64>>,
    pub number_locks: Vec<Vec<bool>>,
}

impl TryFrom<PuzzlePayload> for SudokuPuzzle {
    type Error = ProtocolShapeError;

    /// Narrow the float grid by truncation and pair it with the lock mask.
    /// Anything other than two matching 9x9 grids is a protocol error.
    fn try_from(payload: PuzzlePayload) -> Result<Self, Self::Error> {
        const SIZE: usize = SudokuPuzzle::SIZE;

        if payload.numbers.len() != SIZE || payload.number_locks.len() != SIZE {
            return Err(ProtocolShapeError::GridShape);
        }

        let mut numbers = [[0u8; SIZE]; SIZE];
        let mut locks = [[false; SIZE]; SIZE];

        for (row, values) in payload.numbers.iter().enumerate() {
            if values.len() != SIZE {
                return Err(ProtocolShapeError::GridShape);
            }
            for (col, value) in values.iter().enumerate() {
                let number = *value as i64;
                if !(0..=9).contains(&number) {
                    return Err(ProtocolShapeError::CellOutOfRange(number));
                }
                numbers[row][col] = number as u8;
            }
        }

        for (row, values) in payload.number_locks.iter().enumerate() {
            if values.len() != SIZE {
                return Err(ProtocolShapeError::GridShape);
            }
            for (col, value) in values.iter().enumerate() {
                locks[row][col] = *value;
            }
        }

        Ok(SudokuPuzzle::new(numbers, locks))
    }
}

// An integer that may arrive as a float. Narrowing truncates toward zero.
struct LenientInt(i64);

impl<'de> Deserialize<'de> for LenientInt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IntVisitor;

        impl Visitor<'_> for IntVisitor {
            type Value = LenientInt;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer or floating-point number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LenientInt(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(LenientInt)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(LenientInt(v as i64))
            }
        }

        deserializer.deserialize_any(IntVisitor)
    }
}

fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LenientInt::deserialize(deserializer)?.0)
}

fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LenientInt>::deserialize(deserializer)?.map(|v| v.0))
}

fn frequency_ordinal<'de, D>(deserializer: D) -> Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Frequency::from_ordinal(int(deserializer)?))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::models::SuccessCode;

    fn grid_json(fill: u8) -> Value {
        json!(vec![vec![f64::from(fill); 9]; 9])
    }

    #[test]
    fn requests_carry_their_wire_discriminator() {
        let request = Request::Login {
            username: "user".into(),
            password: "hunter2".into(),
        };
        let encoded: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["request_type"], "login");
        assert_eq!(encoded["username"], "user");
        assert_eq!(encoded["password"], "hunter2");
    }

    #[test]
    fn retrieve_data_serializes_the_selector_list() {
        let request = Request::RetrieveData {
            authentication_token: "tok".into(),
            fields: vec![Resource::Coins],
        };
        let encoded: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["request_type"], "retrieve_data");
        assert_eq!(encoded["fields"], json!(["coins"]));
        assert_eq!(encoded["authentication_token"], "tok");
    }

    #[test]
    fn add_habit_sends_the_frequency_ordinal() {
        let request = Request::AddHabit {
            authentication_token: "tok".into(),
            habit_name: "Stretch".into(),
            habit_frequency: Frequency::Monthly.ordinal(),
        };
        let encoded: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["request_type"], "add_habit");
        assert_eq!(encoded["habit_name"], "Stretch");
        assert_eq!(encoded["habit_frequency"], 2);
    }

    #[test]
    fn update_puzzle_sends_the_full_number_grid() {
        let request = Request::UpdateSudokuPuzzle {
            authentication_token: "tok".into(),
            numbers: [[5; 9]; 9],
        };
        let encoded: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["request_type"], "update_sudoku_puzzle");
        assert_eq!(encoded["numbers"], json!(vec![vec![5; 9]; 9]));
    }

    #[test]
    fn habit_record_decodes_with_float_fields() {
        let reply: RetrieveReply = serde_json::from_value(json!({
            "success_code": 0.0,
            "habits": [
                {"name": "Read", "frequency": 1.0, "id": 3.0, "is_complete": true}
            ]
        }))
        .unwrap();

        let records = reply.habits.unwrap();
        let habit = Habit::try_from(records[0].clone()).unwrap();
        assert_eq!(habit.text(), "Read");
        assert_eq!(habit.frequency(), Frequency::Weekly);
        assert_eq!(habit.id(), Some(3));
        assert!(habit.is_complete());
    }

    #[test]
    fn habit_records_preserve_server_order() {
        let reply: RetrieveReply = serde_json::from_value(json!({
            "success_code": 0,
            "habits": [
                {"name": "Read", "frequency": 1, "id": 3, "is_complete": true},
                {"name": "Run", "frequency": 0, "id": 1, "is_complete": false},
                {"name": "Write", "frequency": 2, "id": 7, "is_complete": false}
            ]
        }))
        .unwrap();

        let names: Vec<String> = reply
            .habits
            .unwrap()
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, ["Read", "Run", "Write"]);
    }

    #[test]
    fn unknown_frequency_in_a_record_decodes_as_daily() {
        let record: HabitRecord = serde_json::from_value(json!(
            {"name": "Nap", "frequency": 99.0, "id": 2, "is_complete": false}
        ))
        .unwrap();
        assert_eq!(record.frequency, Frequency::Daily);
    }

    #[test]
    fn empty_habit_name_is_a_shape_error() {
        let record: HabitRecord = serde_json::from_value(json!(
            {"name": "", "frequency": 0, "id": 2, "is_complete": false}
        ))
        .unwrap();
        assert_eq!(
            Habit::try_from(record).unwrap_err(),
            ProtocolShapeError::EmptyHabitName
        );
    }

    #[test]
    fn puzzle_payload_converts_exactly() {
        let mut numbers = vec![vec![0.0; 9]; 9];
        numbers[0][0] = 9.0;
        numbers[8][8] = 1.0;
        let mut locks = vec![vec![false; 9]; 9];
        locks[0][0] = true;

        let payload: PuzzlePayload = serde_json::from_value(json!({
            "numbers": numbers,
            "number_locks": locks,
        }))
        .unwrap();
        let puzzle = SudokuPuzzle::try_from(payload).unwrap();

        assert_eq!(puzzle.number(0, 0), Some(9));
        assert_eq!(puzzle.number(8, 8), Some(1));
        assert_eq!(puzzle.number(4, 4), Some(0));
        assert_eq!(puzzle.is_locked(0, 0), Some(true));
        assert_eq!(puzzle.is_locked(8, 8), Some(false));
    }

    #[test]
    fn mismatched_grid_dimensions_are_rejected() {
        let payload: PuzzlePayload = serde_json::from_value(json!({
            "numbers": vec![vec![0.0; 9]; 8],
            "number_locks": vec![vec![false; 9]; 9],
        }))
        .unwrap();
        assert_eq!(
            SudokuPuzzle::try_from(payload).unwrap_err(),
            ProtocolShapeError::GridShape
        );

        let ragged: PuzzlePayload = serde_json::from_value(json!({
            "numbers": grid_json(0),
            "number_locks": vec![vec![false; 8]; 9],
        }))
        .unwrap();
        assert_eq!(
            SudokuPuzzle::try_from(ragged).unwrap_err(),
            ProtocolShapeError::GridShape
        );
    }

    #[test]
    fn out_of_range_cell_values_are_rejected() {
        let payload: PuzzlePayload = serde_json::from_value(json!({
            "numbers": vec![vec![12.0; 9]; 9],
            "number_locks": vec![vec![false; 9]; 9],
        }))
        .unwrap();
        assert_eq!(
            SudokuPuzzle::try_from(payload).unwrap_err(),
            ProtocolShapeError::CellOutOfRange(12)
        );
    }

    #[test]
    fn status_reply_tolerates_missing_coins() {
        let reply: StatusReply = serde_json::from_value(json!({"success_code": 0.0})).unwrap();
        assert!(reply.success_code.is_okay());
        assert_eq!(reply.coins, None);
        assert_eq!(reply.error_message, None);

        let rejected: StatusReply = serde_json::from_value(json!({
            "success_code": 12,
            "error_message": "Malformed Request, missing Request Fields (email)"
        }))
        .unwrap();
        assert_eq!(rejected.success_code, SuccessCode::MissingFields);
        assert!(rejected.error_message.is_some());
    }

    #[test]
    fn login_reply_treats_null_token_as_absent() {
        let reply: LoginReply = serde_json::from_value(json!({
            "success_code": 14,
            "authentication_token": null
        }))
        .unwrap();
        assert_eq!(reply.authentication_token, None);
    }

    #[test]
    fn hint_reply_narrows_float_fields() {
        let reply: HintReply = serde_json::from_value(json!({
            "success_code": 0.0,
            "number": 7.0,
            "row": 2.0,
            "col": 4.0,
            "coins": 120.0
        }))
        .unwrap();
        assert_eq!(reply.number, Some(7));
        assert_eq!(reply.row, Some(2));
        assert_eq!(reply.col, Some(4));
        assert_eq!(reply.coins, Some(120));
    }

    #[test]
    fn null_sudoku_puzzle_decodes_as_absent() {
        let reply: RetrieveReply = serde_json::from_value(json!({
            "success_code": 0,
            "sudoku_puzzle": null
        }))
        .unwrap();
        assert!(reply.sudoku_puzzle.is_none());
    }
}
