//! Habitdoku Client Library
//!
//! This library provides a Rust client for the habitdoku server: a
//! habit-tracking application with a sudoku mini-game, speaking a JSON
//! request-reply protocol over a TCP endpoint.
//!
//! ## Usage
//!
//! The [`HabitdokuClient`] struct exposes one async method per server
//! operation. Each call performs a single complete round trip; the session
//! keeps the authentication token and the last known coin balance.
//!
//! ```rust,no_run
//! use habitdoku_client::{Frequency, Habit, HabitdokuClient, DEFAULT_ENDPOINT};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut client = HabitdokuClient::new(DEFAULT_ENDPOINT)?;
//!
//!     // Log in; the session token is stored for subsequent calls
//!     let code = client.validate_login("user", "hunter2").await?;
//!     if !code.is_okay() {
//!         println!("login rejected: {:?}", code);
//!         return Ok(());
//!     }
//!
//!     // Track a new habit
//!     let habit = Habit::new("Read", Frequency::Daily)?;
//!     client.add_habit(&habit).await?;
//!
//!     // List habits in server order
//!     for habit in client.get_habits().await? {
//!         println!("{} (complete: {})", habit.text(), habit.is_complete());
//!     }
//!
//!     // Play some sudoku
//!     let puzzle = client.generate_sudoku_puzzle().await?;
//!     println!("top-left cell: {:?}", puzzle.number(0, 0));
//!
//!     Ok(())
//! }
//! ```
//!
//! Application-level rejection (a non-okay [`SuccessCode`]) is a normal
//! value for mutating operations; transport and decode failures surface as
//! [`ClientError`].

mod client;
mod error;
mod session;

pub use client::HabitdokuClient;
pub use error::ClientError;
pub use session::{Session, DEFAULT_ENDPOINT};

// Re-export common types for convenience
pub use habitdoku_common::{models::*, protocol::*, wire};

pub type Result<T> = std::result::Result<T, ClientError>;
