//! Product registration form state.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::camera::PhotoAttachment;
use crate::location::Coordinates;

/// Crops offered by the crop picker.
pub const CROP_OPTIONS: [&str; 16] = [
    "Rice",
    "Wheat",
    "Sugarcane",
    "Cotton",
    "Maize",
    "Bajra",
    "Jowar",
    "Pulses",
    "Tomatoes",
    "Onions",
    "Potatoes",
    "Cauliflower",
    "Cabbage",
    "Okra",
    "Brinjal",
    "Other",
];

/// Units offered by the unit picker.
pub const UNIT_OPTIONS: [&str; 6] = ["kg", "lbs", "tons", "boxes", "crates", "bunches"];

/// Text fields of the product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CropName,
    Variety,
    Quantity,
    Unit,
    HarvestDate,
    Description,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::CropName => "Crop Name",
            Field::Variety => "Variety",
            Field::Quantity => "Quantity",
            Field::Unit => "Unit",
            Field::HarvestDate => "Harvest Date",
            Field::Description => "Description",
        }
    }
}

/// Fields that must be filled before a product can be registered.
const REQUIRED_FIELDS: [Field; 4] = [
    Field::CropName,
    Field::Quantity,
    Field::Unit,
    Field::HarvestDate,
];

/// A product being filled in on the add-product screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub crop_name: String,
    pub variety: String,
    pub quantity: String,
    pub unit: String,
    pub harvest_date: String,
    pub description: String,
    pub photo: Option<PhotoAttachment>,
    pub location: Option<Coordinates>,
}

impl ProductDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::CropName => &self.crop_name,
            Field::Variety => &self.variety,
            Field::Quantity => &self.quantity,
            Field::Unit => &self.unit,
            Field::HarvestDate => &self.harvest_date,
            Field::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::CropName => self.crop_name = value,
            Field::Variety => self.variety = value,
            Field::Quantity => self.quantity = value,
            Field::Unit => self.unit = value,
            Field::HarvestDate => self.harvest_date = value,
            Field::Description => self.description = value,
        }
    }

    /// Required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<Field> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }

    /// Whether the "Register Product" button is enabled.
    pub fn can_submit(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A product accepted by the registration step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredProduct {
    pub id: String,
    #[serde(flatten)]
    pub draft: ProductDraft,
}

/// Errors raised when registering a product.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Failed to encode product: {0}")]
    Encode(String),
}

/// Product id: the crop's first three letters upper-cased followed by the
/// last three digits of the registration time in unix milliseconds.
pub fn product_id(crop_name: &str, registered_at: SystemTime) -> String {
    let millis = registered_at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let prefix: String = crop_name.trim().chars().take(3).collect();
    format!("{}{:03}", prefix.to_uppercase(), millis % 1000)
}
