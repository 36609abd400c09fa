use serde::{Deserialize, Serialize};

use crate::{Entity, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, tabled::Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";
    const COLLECTION: &'static str = "customers";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();
        err.require_name("name", &self.name);
        if !self.email.is_empty() && !self.email.contains('@') {
            err.push("email", format!("'{}' is not an email address", self.email));
        }
        err.into_result()
    }
}

#[test]
fn test_customer_validate() {
    let customer = |email: &str| Customer {
        name: "Ada".into(),
        email: email.into(),
        ..Default::default()
    };
    assert!(customer("").validate().is_ok());
    assert!(customer("ada@example.com").validate().is_ok());
    assert_eq!(
        customer("ada").validate().unwrap_err().0,
        vec!["email: 'ada' is not an email address".to_string()]
    );
}
