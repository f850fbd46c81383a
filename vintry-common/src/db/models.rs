//! Database models

use crate::position::{Bounds, Placement};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wine style category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WineType {
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

impl WineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "red",
            WineType::White => "white",
            WineType::Rose => "rose",
            WineType::Sparkling => "sparkling",
            WineType::Dessert => "dessert",
            WineType::Fortified => "fortified",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "red" => Ok(WineType::Red),
            "white" => Ok(WineType::White),
            "rose" => Ok(WineType::Rose),
            "sparkling" => Ok(WineType::Sparkling),
            "dessert" => Ok(WineType::Dessert),
            "fortified" => Ok(WineType::Fortified),
            other => Err(Error::InvalidInput(format!("Unknown wine type: {other}"))),
        }
    }
}

/// A bottle (or several identical bottles) in the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wine {
    pub id: Uuid,
    pub name: String,
    pub producer: String,
    pub vintage: Option<i32>,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    pub country: String,
    pub region: Option<String>,
    #[serde(default)]
    pub grape_varieties: Vec<String>,
    pub quantity: i64,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<String>,
    pub purchase_location: Option<String>,
    pub bottle_size: Option<String>,
    pub alcohol_content: Option<f64>,
    /// Drinking window start year
    pub drink_from: Option<i32>,
    /// Drinking window end year
    pub drink_to: Option<i32>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub placement: Placement,
}

impl Wine {
    pub fn new(name: String, producer: String, wine_type: WineType, country: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            producer,
            vintage: None,
            wine_type,
            country,
            region: None,
            grape_varieties: Vec::new(),
            quantity: 1,
            purchase_price: None,
            purchase_date: None,
            purchase_location: None,
            bottle_size: None,
            alcohol_content: None,
            drink_from: None,
            drink_to: None,
            notes: None,
            placement: Placement::Unplaced,
        }
    }
}

/// A named rows x columns storage rack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cellar {
    pub id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub rows: u32,
    pub columns: u32,
}

impl Cellar {
    /// UI-imposed grid limits
    pub const MAX_ROWS: u32 = 20;
    pub const MAX_COLUMNS: u32 = 30;

    pub fn new(name: String, rows: u32, columns: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            notes: None,
            rows,
            columns,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.rows, self.columns)
    }

    /// Validate candidate grid dimensions against the UI-imposed range
    pub fn validate_bounds(rows: u32, columns: u32) -> Result<()> {
        if rows < 1 || rows > Self::MAX_ROWS {
            return Err(Error::InvalidInput(format!(
                "rows must be between 1 and {}",
                Self::MAX_ROWS
            )));
        }
        if columns < 1 || columns > Self::MAX_COLUMNS {
            return Err(Error::InvalidInput(format!(
                "columns must be between 1 and {}",
                Self::MAX_COLUMNS
            )));
        }
        Ok(())
    }
}

/// Append-only tasting note attached to a wine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TastingNote {
    pub id: Uuid,
    pub wine_id: Uuid,
    /// 1-5 stars
    pub rating: i32,
    /// ISO-8601 timestamp of the tasting
    pub tasted_at: String,
    pub appearance: Option<String>,
    pub aroma: Option<String>,
    pub taste: Option<String>,
    pub finish: Option<String>,
    pub food_pairing: Option<String>,
    pub notes: Option<String>,
}

/// Append-only consumption event attached to a wine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkingRecord {
    pub id: Uuid,
    pub wine_id: Uuid,
    pub quantity: i64,
    /// ISO-8601 timestamp of consumption
    pub drunk_at: String,
    pub occasion: Option<String>,
    pub notes: Option<String>,
}

/// Reference to a stored label/bottle photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WineImage {
    pub id: Uuid,
    pub wine_id: Uuid,
    /// Backend-specific reference: filesystem path or blob key
    pub image_ref: String,
    pub display_order: i64,
}
