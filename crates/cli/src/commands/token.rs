use clap::Parser;
use serde_json::json;

use super::print_json;
use crate::Context;

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct TokenCommand {
    /// Bind the token to a vaulted customer
    #[arg(long = "customer-id", short = 'c')]
    pub customer_id: Option<String>,
}

impl TokenCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let client = ctx.connect().await?;
        let token = client
            .generate_client_token(self.customer_id.as_deref())
            .await
            .map_err(|e| e.to_string())?;

        print_json(&json!({ "clientToken": token.into_inner() }))
    }
}
