use habitdoku_client::{Frequency, Habit, HabitdokuClient, DEFAULT_ENDPOINT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create a client connecting to the server
    let mut client = HabitdokuClient::new(DEFAULT_ENDPOINT)?;

    // Register an account and log in
    let code = client
        .register_credentials("demo", "hunter2", "demo@example.com")
        .await?;
    println!("Registration result: {:?}", code);

    let code = client.validate_login("demo", "hunter2").await?;
    if !code.is_okay() {
        println!("Login rejected: {:?}", code);
        return Ok(());
    }
    println!("Logged in, token: {}", client.token());

    // Track a habit
    let habit = Habit::new("Read for 20 minutes", Frequency::Daily)?;
    let code = client.add_habit(&habit).await?;
    println!("Add habit result: {:?}", code);

    // List habits and complete the first one
    let habits = client.get_habits().await?;
    for habit in &habits {
        println!(
            "#{:?} {} ({:?}, complete: {})",
            habit.id(),
            habit.text(),
            habit.frequency(),
            habit.is_complete()
        );
    }

    if let Some(first) = habits.first() {
        let code = client.complete_habit(first).await?;
        println!("Complete result: {:?}", code);
    }

    // Completing habits awards coins
    let coins = client.get_coins().await?;
    println!("Coin balance: {}", coins);

    Ok(())
}
