use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Entity, ValidationError};

// One line of an invoice: a quantity of a product at a unit price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product_id: u32,
    pub quantity: u32,
    pub price: f64,
    // Discount per unit.
    #[serde(default)]
    pub discount: f64,
}

impl InvoiceItem {
    // quantity * (price - discount), computed on every call and never
    // serialized, so stored data cannot disagree with it.
    pub fn total_price(&self) -> f64 {
        f64::from(self.quantity) * (self.price - self.discount)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn item_count(items: &Vec<InvoiceItem>) -> String {
    items.len().to_string()
}

fn float2(f: &f64) -> String {
    format!("{:.2}", f)
}

// Invoice bills a customer for a list of items.
// The amount fields are stored as supplied; nothing here derives them from
// the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, tabled::Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub id: u32,

    #[tabled(rename = "customer")]
    pub customer_id: u32,

    #[tabled(display_with = "item_count")]
    pub items: Vec<InvoiceItem>,

    #[serde(default)]
    #[tabled(rename = "total", display_with = "float2")]
    pub total_amount: f64,

    #[serde(default)]
    #[tabled(display_with = "float2")]
    pub discount: f64,

    #[serde(default)]
    #[tabled(display_with = "float2")]
    pub tax: f64,

    #[serde(default)]
    #[tabled(rename = "final", display_with = "float2")]
    pub final_amount: f64,

    // e.g. "cash", "card".
    #[tabled(rename = "payment")]
    pub payment_option: String,

    #[serde(default = "today")]
    #[tabled(rename = "date")]
    pub invoice_date: NaiveDate,
}

impl Entity for Invoice {
    const NAME: &'static str = "Invoice";
    const COLLECTION: &'static str = "invoices";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();
        err.require_non_negative("totalAmount", self.total_amount);
        err.require_non_negative("discount", self.discount);
        err.require_non_negative("tax", self.tax);
        err.require_non_negative("finalAmount", self.final_amount);
        err.require_name("paymentOption", &self.payment_option);
        for (i, item) in self.items.iter().enumerate() {
            err.require_non_negative(&format!("items[{i}].price"), item.price);
            err.require_non_negative(&format!("items[{i}].discount"), item.discount);
        }
        err.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn invoice() -> Invoice {
        Invoice {
            id: 0,
            customer_id: 1,
            items: vec![InvoiceItem {
                product_id: 2,
                quantity: 3,
                price: 10.0,
                discount: 2.0,
            }],
            total_amount: 24.0,
            discount: 0.0,
            tax: 2.4,
            final_amount: 26.4,
            payment_option: "card".into(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        }
    }

    #[test]
    fn test_item_total_price() {
        let mut item = invoice().items.remove(0);
        assert_eq!(item.total_price(), 24.0);
        item.quantity = 5;
        assert_eq!(item.total_price(), 40.0);
        item.discount = 0.0;
        assert_eq!(item.total_price(), 50.0);
    }

    #[test]
    fn test_item_total_price_not_serialized() {
        let value = serde_json::to_value(&invoice().items[0]).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "productId": 2,
                "quantity": 3,
                "price": 10.0,
                "discount": 2.0,
            })
        );

        // A stale total from a client is ignored.
        let item: InvoiceItem = serde_json::from_str(
            r#"{"productId": 2, "quantity": 3, "price": 10, "discount": 2, "totalPrice": 99}"#,
        )
        .unwrap();
        assert_eq!(item.total_price(), 24.0);
    }

    #[test]
    fn test_invoice_json() {
        let json = r#"{
            "customerId": 1,
            "items": [{"productId": 2, "quantity": 3, "price": 10.0, "discount": 2.0}],
            "totalAmount": 24.0,
            "tax": 2.4,
            "finalAmount": 26.4,
            "paymentOption": "card",
            "invoiceDate": "2024-07-01"
        }"#;
        let actual: Invoice = serde_json::from_str(json).unwrap();
        assert_eq!(actual, invoice());
    }

    #[test]
    fn test_invoice_json_missing_required() {
        // No paymentOption.
        let json = r#"{"customerId": 1, "items": []}"#;
        assert!(serde_json::from_str::<Invoice>(json).is_err());
        // No items.
        let json = r#"{"customerId": 1, "paymentOption": "cash"}"#;
        assert!(serde_json::from_str::<Invoice>(json).is_err());
    }

    #[test]
    fn test_invoice_validate() {
        assert!(invoice().validate().is_ok());

        let mut bad = invoice();
        bad.tax = -1.0;
        bad.payment_option = " ".into();
        bad.items[0].discount = -2.0;
        let err = bad.validate().unwrap_err();
        assert_eq!(
            err.0,
            vec![
                "tax: must be a non-negative number, got -1".to_string(),
                "paymentOption: is required".to_string(),
                "items[0].discount: must be a non-negative number, got -2".to_string(),
            ]
        );
    }
}
