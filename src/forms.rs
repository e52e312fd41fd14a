use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_valid::Validate;

/// Input shapes accepted at the application boundary. Field validation here
/// is deliberately shallow; anything the entity layer does not enforce
/// (price sign, email shape beyond the domain check) stays unenforced.

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(min_length = 3)]
    pub email: String,
    #[validate(min_length = 8)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListingForm {
    #[validate(min_length = 1)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial update for a listing; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ListingUpdate {
    pub fn into_patch(self) -> Map<String, Value> {
        let mut patch = Map::new();
        if let Some(title) = self.title {
            patch.insert("title".to_string(), Value::from(title));
        }
        if let Some(description) = self.description {
            patch.insert("description".to_string(), Value::from(description));
        }
        if let Some(price) = self.price {
            patch.insert("price".to_string(), Value::from(price));
        }
        if let Some(image) = self.image {
            patch.insert("image".to_string(), Value::from(image));
        }
        if let Some(tags) = self.tags {
            patch.insert("tags".to_string(), Value::from(tags));
        }
        patch
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CardForm {
    #[validate(min_length = 12)]
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardUpdate {
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
}
