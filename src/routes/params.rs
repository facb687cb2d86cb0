use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::ConsultantStatus;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConsultantQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub specialization: Option<String>,
    pub status: Option<ConsultantStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQuery {
    /// Only slots on this day.
    pub date: Option<NaiveDate>,
    /// Only slots on or after this day.
    pub from: Option<NaiveDate>,
    /// Hide slots held by an active appointment.
    pub open_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub consultant_id: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub include_drafts: Option<bool>,
}

macro_rules! paged {
    ($($query:ty),+ $(,)?) => {
        $(impl $query {
            pub fn pagination(&self) -> Pagination {
                Pagination::new(self.page, self.per_page)
            }
        })+
    };
}

paged!(ConsultantQuery, ServiceQuery, AppointmentListQuery, BlogQuery);

#[cfg(test)]
mod tests {
    use axum::{extract::Query, http::Uri};

    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (3, 100, 200));
        let p = Pagination {
            page: Some(-2),
            per_page: Some(0),
        };
        assert_eq!(p.normalize(), (1, 1, 0));
    }

    #[test]
    fn query_strings_parse_numbers_and_filters() {
        let uri: Uri = "/api/consultants?page=2&per_page=5&status=online&q=tax"
            .parse()
            .unwrap();
        let Query(q) = Query::<ConsultantQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.pagination().normalize(), (2, 5, 5));
        assert_eq!(q.status, Some(ConsultantStatus::Online));
        assert_eq!(q.q.as_deref(), Some("tax"));

        let uri: Uri = "/x?date=2024-03-10&open_only=true".parse().unwrap();
        let Query(q) = Query::<SlotQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(q.date, NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(q.open_only, Some(true));
    }
}
