use serde::{Deserialize, Serialize};

use crate::{Entity, ValidationError};

fn float2(f: &f64) -> String {
    format!("{:.2}", f)
}

fn opt_id(id: &Option<u32>) -> String {
    id.map(|x| x.to_string()).unwrap_or_default()
}

// Product describes a single item that can be sold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, tabled::Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: u32,

    pub name: String,

    #[serde(default)]
    pub description: String,

    // Unit price, before any per-line discount.
    #[tabled(display_with = "float2")]
    pub price: f64,

    // The Category this product belongs to, if any.
    // Not checked against the category store.
    #[serde(default)]
    #[tabled(rename = "category", display_with = "opt_id")]
    pub category_id: Option<u32>,
}

impl Entity for Product {
    const NAME: &'static str = "Product";
    const COLLECTION: &'static str = "products";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();
        err.require_name("name", &self.name);
        err.require_non_negative("price", self.price);
        err.into_result()
    }
}

#[test]
fn test_product_json() {
    let product: Product =
        serde_json::from_str(r#"{"id": 3, "name": "Oats", "price": 4.5, "categoryId": 2}"#)
            .unwrap();
    assert_eq!(
        product,
        Product {
            id: 3,
            name: "Oats".into(),
            description: "".into(),
            price: 4.5,
            category_id: Some(2),
        }
    );
    assert_eq!(
        serde_json::to_value(&product).unwrap(),
        serde_json::json!({
            "id": 3,
            "name": "Oats",
            "description": "",
            "price": 4.5,
            "categoryId": 2,
        })
    );
}

#[test]
fn test_product_validate() {
    let product = Product {
        name: "Oats".into(),
        price: 0.0,
        ..Default::default()
    };
    assert!(product.validate().is_ok());

    let err = Product {
        name: "".into(),
        price: -1.0,
        ..Default::default()
    }
    .validate()
    .unwrap_err();
    assert_eq!(err.0.len(), 2);
}
