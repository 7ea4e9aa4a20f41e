use habitdoku_client::{HabitdokuClient, DEFAULT_ENDPOINT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut client = HabitdokuClient::new(DEFAULT_ENDPOINT)?;

    let code = client.validate_login("demo", "hunter2").await?;
    if !code.is_okay() {
        println!("Login rejected: {:?}", code);
        return Ok(());
    }

    // Resume the stored puzzle if there is one, otherwise generate a new one
    let mut puzzle = match client.get_sudoku_puzzle().await? {
        Some(puzzle) => {
            println!("Resuming stored puzzle");
            puzzle
        }
        None => {
            println!("No stored puzzle, generating a new one");
            client.generate_sudoku_puzzle().await?
        }
    };

    // Print the grid; locked cells are the given clues
    for row in 0..9 {
        for col in 0..9 {
            let number = puzzle.number(row, col).unwrap_or(0);
            let locked = puzzle.is_locked(row, col).unwrap_or(false);
            print!("{}{} ", number, if locked { "*" } else { " " });
        }
        println!();
    }

    // Fill in the first open cell
    'outer: for row in 0..9 {
        for col in 0..9 {
            if puzzle.number(row, col) == Some(0) && puzzle.set_number(row, col, 1).is_ok() {
                println!("Wrote 1 into ({}, {})", row, col);
                break 'outer;
            }
        }
    }

    // Push our progress back to the server
    let code = client.update_sudoku_puzzle(&puzzle).await?;
    println!("Update result: {:?}", code);

    // Spend coins on a hint
    match client.buy_hint().await {
        Ok(hint) => println!(
            "Hint: {} at ({}, {}), {} coins left",
            hint.number, hint.row, hint.col, hint.coins
        ),
        Err(e) => println!("Could not buy a hint: {}", e),
    }

    Ok(())
}
