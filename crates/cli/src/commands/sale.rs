use clap::Parser;
use paybridge_sdk::SaleFields;
use serde_json::Value as JsonValue;

use super::print_json;
use crate::Context;

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct SaleCommand {
    /// Amount to charge, e.g. 10.00
    #[arg(long = "amount", short = 'a')]
    pub amount: String,

    /// Payment method nonce from the front-end
    #[arg(long = "nonce", short = 'n')]
    pub nonce: Option<String>,

    #[arg(long = "customer-id")]
    pub customer_id: Option<String>,

    #[arg(long = "order-id")]
    pub order_id: Option<String>,

    /// Book this sale on a merchant account other than the configured default
    #[arg(long = "account")]
    pub merchant_account_id: Option<String>,

    /// Settle immediately instead of only authorizing
    #[arg(long = "submit")]
    pub submit_for_settlement: bool,

    /// Extra request field as key=value; JSON values are parsed
    #[arg(long = "field", short = 'f', value_parser = parse_field)]
    pub fields: Vec<(String, JsonValue)>,
}

impl SaleCommand {
    pub fn sale_fields(&self) -> SaleFields {
        let mut sale = SaleFields::new(self.amount.clone());
        if let Some(nonce) = &self.nonce {
            sale = sale.with_payment_method_nonce(nonce.clone());
        }
        if let Some(customer_id) = &self.customer_id {
            sale = sale.with_customer_id(customer_id.clone());
        }
        if let Some(order_id) = &self.order_id {
            sale = sale.with_order_id(order_id.clone());
        }
        if let Some(merchant_account_id) = &self.merchant_account_id {
            sale = sale.with_merchant_account_id(merchant_account_id.clone());
        }
        for (key, value) in &self.fields {
            sale = sale.with_field(key.clone(), value.clone());
        }
        if self.submit_for_settlement {
            sale = sale.submit_for_settlement();
        }
        sale
    }

    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        let client = ctx.connect().await?;
        let result = client
            .sale(self.sale_fields().into())
            .await
            .map_err(|e| e.to_string())?;

        if !result.is_success() {
            eprintln!("Sale {} was not successful: {:?}", result.id, result.status);
        }
        print_json(&result)
    }
}

fn parse_field(raw: &str) -> Result<(String, JsonValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid field '{}': expected key=value", raw))?;
    if key.is_empty() {
        return Err(format!("Invalid field '{}': empty key", raw));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((key.to_string(), value))
}
