use habitdoku_common::models::{Habit, Hint, SuccessCode, SudokuPuzzle};
use habitdoku_common::protocol::{
    HintReply, LoginReply, Request, Resource, RetrieveReply, StatusReply,
};
use tracing::{debug, info, warn};

use crate::{ClientError, Session};

/// Client for the habitdoku server protocol.
///
/// One method per supported operation; each builds a fresh request
/// envelope, performs a single round trip on the underlying [`Session`],
/// and decodes the operation-specific reply.
pub struct HabitdokuClient {
    session: Session,
}

impl HabitdokuClient {
    /// Create a client connecting to the specified `tcp://host:port`
    /// endpoint.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Ok(Self {
            session: Session::new(endpoint)?,
        })
    }

    /// The session's current authentication token.
    pub fn token(&self) -> &str {
        self.session.token()
    }

    /// Restore a previously issued token, e.g. when resuming a session.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.session.set_token(token);
    }

    /// The coin balance cached from the most recent reply that carried one.
    pub fn cached_coins(&self) -> i64 {
        self.session.coins()
    }

    /// Register a new account.
    pub async fn register_credentials(
        &mut self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<SuccessCode, ClientError> {
        let request = Request::RegisterUser {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        let reply: StatusReply = self.session.round_trip(&request).await?;
        warn_rejected("register_user", reply.success_code, &reply.error_message);
        Ok(reply.success_code)
    }

    /// Log in. A token present in the reply replaces the session token
    /// whether or not the login succeeded; an absent or null token leaves
    /// the previous token untouched.
    pub async fn validate_login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<SuccessCode, ClientError> {
        let request = Request::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        let reply: LoginReply = self.session.round_trip(&request).await?;
        if let Some(token) = reply.authentication_token {
            self.session.set_token(token);
        }
        info!(code = reply.success_code.code(), "login attempt finished");
        warn_rejected("login", reply.success_code, &reply.error_message);
        Ok(reply.success_code)
    }

    /// Retrieve the coin balance. The session cache is updated as a side
    /// effect.
    pub async fn get_coins(&mut self) -> Result<i64, ClientError> {
        let reply = self.retrieve(Resource::Coins).await?;
        let coins = reply
            .coins
            .ok_or(ClientError::MissingReplyField("coins"))?;
        self.session.set_coins(coins);
        Ok(coins)
    }

    /// Retrieve all habits, preserving server order.
    pub async fn get_habits(&mut self) -> Result<Vec<Habit>, ClientError> {
        let reply = self.retrieve(Resource::Habits).await?;
        let records = reply
            .habits
            .ok_or(ClientError::MissingReplyField("habits"))?;
        debug!(count = records.len(), "retrieved habit records");
        let habits = records
            .into_iter()
            .map(Habit::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    /// Retrieve the stored sudoku puzzle, or `None` if the server has none
    /// for this user.
    pub async fn get_sudoku_puzzle(&mut self) -> Result<Option<SudokuPuzzle>, ClientError> {
        let reply = self.retrieve(Resource::SudokuPuzzle).await?;
        match reply.sudoku_puzzle {
            Some(payload) => Ok(Some(SudokuPuzzle::try_from(payload)?)),
            None => Ok(None),
        }
    }

    /// Submit a new habit.
    pub async fn add_habit(&mut self, habit: &Habit) -> Result<SuccessCode, ClientError> {
        let request = Request::AddHabit {
            authentication_token: self.session.token().to_string(),
            habit_name: habit.text().to_string(),
            habit_frequency: habit.frequency().ordinal(),
        };
        let reply: StatusReply = self.session.round_trip(&request).await?;
        warn_rejected("add_habit", reply.success_code, &reply.error_message);
        Ok(reply.success_code)
    }

    /// Remove a habit. The habit must carry a server id.
    pub async fn remove_habit(&mut self, habit: &Habit) -> Result<SuccessCode, ClientError> {
        let habit_id = habit.id().ok_or(ClientError::HabitNotSynced)?;
        let request = Request::RemoveHabit {
            authentication_token: self.session.token().to_string(),
            habit_id,
        };
        let reply: StatusReply = self.session.round_trip(&request).await?;
        warn_rejected("remove_habit", reply.success_code, &reply.error_message);
        Ok(reply.success_code)
    }

    /// Replace a habit's name and frequency. The habit must carry a
    /// server id.
    pub async fn modify_habit(&mut self, habit: &Habit) -> Result<SuccessCode, ClientError> {
        let habit_id = habit.id().ok_or(ClientError::HabitNotSynced)?;
        let request = Request::ModifyHabit {
            authentication_token: self.session.token().to_string(),
            habit_name: habit.text().to_string(),
            habit_frequency: habit.frequency().ordinal(),
            habit_id,
        };
        let reply: StatusReply = self.session.round_trip(&request).await?;
        warn_rejected("modify_habit", reply.success_code, &reply.error_message);
        Ok(reply.success_code)
    }

    /// Mark a habit complete. The reply's coin balance, when present,
    /// updates the session cache.
    pub async fn complete_habit(&mut self, habit: &Habit) -> Result<SuccessCode, ClientError> {
        let habit_id = habit.id().ok_or(ClientError::HabitNotSynced)?;
        let request = Request::CompleteHabits {
            authentication_token: self.session.token().to_string(),
            habit_ids: vec![habit_id],
        };
        let reply: StatusReply = self.session.round_trip(&request).await?;
        if let Some(coins) = reply.coins {
            self.session.set_coins(coins);
        }
        warn_rejected("complete_habits", reply.success_code, &reply.error_message);
        Ok(reply.success_code)
    }

    /// Ask the server for a fresh puzzle.
    pub async fn generate_sudoku_puzzle(&mut self) -> Result<SudokuPuzzle, ClientError> {
        let request = Request::GenerateSudokuPuzzle {
            authentication_token: self.session.token().to_string(),
        };
        let reply: RetrieveReply = self.session.round_trip(&request).await?;
        reject_on_failure(reply.success_code, reply.error_message)?;
        let payload = reply
            .sudoku_puzzle
            .ok_or(ClientError::MissingReplyField("sudoku_puzzle"))?;
        Ok(SudokuPuzzle::try_from(payload)?)
    }

    /// Store the puzzle's current numbers on the server.
    pub async fn update_sudoku_puzzle(
        &mut self,
        puzzle: &SudokuPuzzle,
    ) -> Result<SuccessCode, ClientError> {
        let request = Request::UpdateSudokuPuzzle {
            authentication_token: self.session.token().to_string(),
            numbers: *puzzle.numbers(),
        };
        let reply: StatusReply = self.session.round_trip(&request).await?;
        warn_rejected(
            "update_sudoku_puzzle",
            reply.success_code,
            &reply.error_message,
        );
        Ok(reply.success_code)
    }

    /// Spend coins to reveal one cell. The session's coin cache is updated
    /// with the post-purchase balance.
    pub async fn buy_hint(&mut self) -> Result<Hint, ClientError> {
        let request = Request::BuyHint {
            authentication_token: self.session.token().to_string(),
        };
        let reply: HintReply = self.session.round_trip(&request).await?;
        reject_on_failure(reply.success_code, reply.error_message)?;

        let hint = Hint {
            number: reply.number.ok_or(ClientError::MissingReplyField("number"))?,
            row: reply.row.ok_or(ClientError::MissingReplyField("row"))?,
            col: reply.col.ok_or(ClientError::MissingReplyField("col"))?,
            coins: reply.coins.ok_or(ClientError::MissingReplyField("coins"))?,
        };
        self.session.set_coins(hint.coins);
        Ok(hint)
    }

    async fn retrieve(&mut self, resource: Resource) -> Result<RetrieveReply, ClientError> {
        let request = Request::RetrieveData {
            authentication_token: self.session.token().to_string(),
            fields: vec![resource],
        };
        let mut reply: RetrieveReply = self.session.round_trip(&request).await?;
        reject_on_failure(reply.success_code, reply.error_message.take())?;
        Ok(reply)
    }
}

/// Retrieval-style operations promise a resource; a non-okay code means
/// there is none to return.
fn reject_on_failure(
    code: Option<SuccessCode>,
    message: Option<String>,
) -> Result<(), ClientError> {
    match code {
        Some(code) if !code.is_okay() => Err(ClientError::Server { code, message }),
        _ => Ok(()),
    }
}

fn warn_rejected(operation: &'static str, code: SuccessCode, message: &Option<String>) {
    if !code.is_okay() {
        warn!(
            operation,
            code = code.code(),
            message = message.as_deref().unwrap_or(""),
            "server rejected request"
        );
    }
}
