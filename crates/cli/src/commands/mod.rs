mod customer;
mod sale;
mod token;

pub use customer::FindCustomerCommand;
pub use sale::SaleCommand;
pub use token::TokenCommand;

/// Pretty-print a value as JSON on stdout
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", output);
    Ok(())
}
