use serde::Deserialize;
use time::PrimitiveDateTime;

use super::wire_time;

/// Parking-space category tracked by the Wellpark API.
///
/// Each category maps to a `free_quantity*`/`total_quantity*` column pair on
/// the park record; [`SpotCategory::General`] is the unsuffixed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotCategory {
    Motorcycle,
    Disabled,
    Carpool,
    Electric,
    Oversized,
    General,
}

impl SpotCategory {
    /// All categories, in the order forecasts are produced.
    pub const ALL: [SpotCategory; 6] = [
        SpotCategory::Motorcycle,
        SpotCategory::Disabled,
        SpotCategory::Carpool,
        SpotCategory::Electric,
        SpotCategory::Oversized,
        SpotCategory::General,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of this category within [`SpotCategory::ALL`].
    pub fn index(self) -> usize {
        match self {
            SpotCategory::Motorcycle => 0,
            SpotCategory::Disabled => 1,
            SpotCategory::Carpool => 2,
            SpotCategory::Electric => 3,
            SpotCategory::Oversized => 4,
            SpotCategory::General => 5,
        }
    }

    /// API column name of the free-space counter for this category.
    pub fn free_field(self) -> &'static str {
        match self {
            SpotCategory::Motorcycle => "free_quantity_mot",
            SpotCategory::Disabled => "free_quantity_dis",
            SpotCategory::Carpool => "free_quantity_cw",
            SpotCategory::Electric => "free_quantity_ecar",
            SpotCategory::Oversized => "free_quantity_big",
            SpotCategory::General => "free_quantity",
        }
    }
}

/// One stored occupancy reading for a parking lot.
///
/// Counters are optional: a lot without a given category reports the pair as
/// null or omits it entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct ParkObservation {
    pub park_no: String,
    #[serde(default)]
    pub parking_name: Option<String>,
    #[serde(with = "wire_time")]
    pub update_time: PrimitiveDateTime,
    #[serde(default)]
    pub free_quantity: Option<u32>,
    #[serde(default)]
    pub total_quantity: Option<u32>,
    #[serde(default)]
    pub free_quantity_mot: Option<u32>,
    #[serde(default)]
    pub total_quantity_mot: Option<u32>,
    #[serde(default)]
    pub free_quantity_dis: Option<u32>,
    #[serde(default)]
    pub total_quantity_dis: Option<u32>,
    #[serde(default)]
    pub free_quantity_cw: Option<u32>,
    #[serde(default)]
    pub total_quantity_cw: Option<u32>,
    #[serde(default)]
    pub free_quantity_ecar: Option<u32>,
    #[serde(default)]
    pub total_quantity_ecar: Option<u32>,
    #[serde(default)]
    pub free_quantity_big: Option<u32>,
    #[serde(default)]
    pub total_quantity_big: Option<u32>,
}

impl ParkObservation {
    pub fn free_count(&self, category: SpotCategory) -> Option<u32> {
        match category {
            SpotCategory::Motorcycle => self.free_quantity_mot,
            SpotCategory::Disabled => self.free_quantity_dis,
            SpotCategory::Carpool => self.free_quantity_cw,
            SpotCategory::Electric => self.free_quantity_ecar,
            SpotCategory::Oversized => self.free_quantity_big,
            SpotCategory::General => self.free_quantity,
        }
    }

    pub fn total_count(&self, category: SpotCategory) -> Option<u32> {
        match category {
            SpotCategory::Motorcycle => self.total_quantity_mot,
            SpotCategory::Disabled => self.total_quantity_dis,
            SpotCategory::Carpool => self.total_quantity_cw,
            SpotCategory::Electric => self.total_quantity_ecar,
            SpotCategory::Oversized => self.total_quantity_big,
            SpotCategory::General => self.total_quantity,
        }
    }
}

/// One row of the `latest-parks` listing; only the lot number is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct ParkSummary {
    pub park_no: String,
    #[serde(default)]
    pub parking_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn observation_deserializes_with_missing_and_null_counters() {
        let json = r#"{
            "park_no": "004",
            "parking_name": "City Hall",
            "update_time": "2024-10-17 05:47:04",
            "free_quantity": 31,
            "total_quantity": 120,
            "free_quantity_mot": null,
            "total_quantity_mot": null,
            "free_quantity_dis": 2,
            "total_quantity_dis": 4
        }"#;

        let obs: ParkObservation = serde_json::from_str(json).expect("valid observation");
        assert_eq!(obs.park_no, "004");
        assert_eq!(obs.update_time, datetime!(2024-10-17 05:47:04));
        assert_eq!(obs.free_count(SpotCategory::General), Some(31));
        assert_eq!(obs.free_count(SpotCategory::Motorcycle), None);
        assert_eq!(obs.free_count(SpotCategory::Disabled), Some(2));
        assert_eq!(obs.total_count(SpotCategory::Disabled), Some(4));
        assert_eq!(obs.free_count(SpotCategory::Electric), None);
    }

    #[test]
    fn observation_rejects_malformed_timestamp() {
        let json = r#"{"park_no": "004", "update_time": "2024-10-17T05:47:04Z"}"#;
        let res: Result<ParkObservation, _> = serde_json::from_str(json);
        assert!(res.is_err());
    }

    #[test]
    fn category_indices_match_declaration_order() {
        for (i, category) in SpotCategory::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn general_category_uses_unsuffixed_field() {
        assert_eq!(SpotCategory::General.free_field(), "free_quantity");
        assert_eq!(SpotCategory::Electric.free_field(), "free_quantity_ecar");
    }
}
