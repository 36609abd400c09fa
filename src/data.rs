use serde::{de::DeserializeOwned, Serialize};

// A type that can be stored in a Repository.
pub trait Entity: Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static {
    // Human readable name used in messages, e.g. "Product".
    const NAME: &'static str;

    // The plural name of the collection. This names both the backing file
    // and the URL segment under /api.
    const COLLECTION: &'static str;

    // Return the path, relative to the data directory, of the file holding
    // every item of this type. Includes the extension.
    fn path() -> std::path::PathBuf {
        std::path::PathBuf::from(Self::COLLECTION).with_extension("json")
    }

    fn id(&self) -> u32;

    fn set_id(&mut self, id: u32);

    // Check field constraints that serde alone cannot express.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

// One message per offending field, formatted as "field: reason".
#[derive(Debug, Default, Clone, PartialEq, thiserror::Error)]
#[error("validation failed: {}", .0.join("; "))]
pub struct ValidationError(pub Vec<String>);

impl ValidationError {
    pub fn push(&mut self, field: &str, reason: impl std::fmt::Display) {
        self.0.push(format!("{field}: {reason}"));
    }

    pub fn require_name(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    pub fn require_non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.push(field, format!("must be a non-negative number, got {value}"));
        }
    }

    // Ok if nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[test]
fn test_validation_error() {
    let mut err = ValidationError::default();
    err.require_name("name", "  ");
    err.require_non_negative("price", -1.5);
    err.require_non_negative("tax", f64::NAN);
    err.require_non_negative("discount", 0.0);
    assert_eq!(
        err.to_string(),
        "validation failed: name: is required; \
         price: must be a non-negative number, got -1.5; \
         tax: must be a non-negative number, got NaN"
    );
    assert!(ValidationError::default().into_result().is_ok());
}
