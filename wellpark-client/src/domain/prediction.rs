use serde::Serialize;
use time::PrimitiveDateTime;

use super::{wire_time, SpotCategory};

/// One forecast row for a lot, uploaded form-encoded to `pred-park`.
///
/// Counts are already rounded and clamped at zero.
#[derive(Debug, Clone, Serialize)]
pub struct PredictedPark {
    pub park_no: String,
    pub free_quantity: u32,
    pub free_quantity_big: u32,
    pub free_quantity_mot: u32,
    pub free_quantity_dis: u32,
    pub free_quantity_cw: u32,
    pub free_quantity_ecar: u32,
    #[serde(with = "wire_time")]
    pub future_time: PrimitiveDateTime,
}

impl PredictedPark {
    /// A row with every counter at zero; counters are filled in per category
    /// as forecasts complete.
    pub fn new(park_no: String, future_time: PrimitiveDateTime) -> Self {
        Self {
            park_no,
            free_quantity: 0,
            free_quantity_big: 0,
            free_quantity_mot: 0,
            free_quantity_dis: 0,
            free_quantity_cw: 0,
            free_quantity_ecar: 0,
            future_time,
        }
    }

    pub fn set_free_count(&mut self, category: SpotCategory, value: u32) {
        match category {
            SpotCategory::Motorcycle => self.free_quantity_mot = value,
            SpotCategory::Disabled => self.free_quantity_dis = value,
            SpotCategory::Carpool => self.free_quantity_cw = value,
            SpotCategory::Electric => self.free_quantity_ecar = value,
            SpotCategory::Oversized => self.free_quantity_big = value,
            SpotCategory::General => self.free_quantity = value,
        }
    }
}
