use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::AvailabilitySlot;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSlotRequest {
    pub date: NaiveDate,
    #[schema(value_type = String, example = "10:00")]
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:30")]
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SlotList {
    #[schema(value_type = Vec<AvailabilitySlot>)]
    pub items: Vec<AvailabilitySlot>,
}

/// Accepts `HH:MM` as well as `HH:MM:SS`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).ok_or_else(|| D::Error::custom(format!("invalid time: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_times() {
        assert_eq!(hhmm::parse("10:30"), NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(hhmm::parse("10:30:15"), NaiveTime::from_hms_opt(10, 30, 15));
        assert_eq!(hhmm::parse("25:00"), None);
    }

    #[test]
    fn slot_request_from_json() {
        let req: CreateSlotRequest = serde_json::from_str(
            r#"{"date":"2024-03-10","start_time":"10:00","end_time":"10:30"}"#,
        )
        .unwrap();
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(req.start_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(req.end_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }
}
