use serde::{Deserialize, Serialize};

use crate::{Entity, ValidationError};

// A grouping of products, e.g. "Hardware".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, tabled::Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Entity for Category {
    const NAME: &'static str = "Category";
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::default();
        err.require_name("name", &self.name);
        err.into_result()
    }
}

#[test]
fn test_category_json() {
    let cat: Category = serde_json::from_str(r#"{"name": "Tools"}"#).unwrap();
    assert_eq!(
        cat,
        Category {
            id: 0,
            name: "Tools".into(),
            description: "".into(),
        }
    );
    assert!(cat.validate().is_ok());
    assert!(Category::default().validate().is_err());
    assert_eq!(Category::path(), std::path::PathBuf::from("categories.json"));
}
