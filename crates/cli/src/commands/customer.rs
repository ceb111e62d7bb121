use clap::Parser;
use paybridge_sdk::Lookup;

use super::print_json;
use crate::Context;

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct FindCustomerCommand {
    /// Customer id
    pub id: String,
}

impl FindCustomerCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let mut client = ctx.connect().await?;

        match client.customer().find(&self.id).await {
            Lookup::Found(customer) => print_json(&customer),
            Lookup::NotFound => Err(format!("Customer '{}' not found", self.id)),
        }
    }
}
