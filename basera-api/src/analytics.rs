use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use basera_core::analytics::{DashboardAnalytics, OwnerAnalytics, TrendPeriod};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    fn parse(&self) -> Result<TrendPeriod, AppError> {
        match &self.period {
            None => Ok(TrendPeriod::Month),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Validation("Period must be week, month or year".to_string())),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/analytics/dashboard", get(dashboard_analytics))
        .route("/v1/analytics/owner", get(owner_analytics))
}

/// GET /v1/analytics/dashboard?period=week|month|year
async fn dashboard_analytics(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardAnalytics>, AppError> {
    if !user.role.is_admin() {
        return Err(AppError::Authorization("Admin access required".to_string()));
    }

    let period = query.parse()?;
    let analytics = state.analytics.admin_dashboard(period, Utc::now()).await.map_err(AppError::from_repo)?;
    Ok(Json(analytics))
}

/// GET /v1/analytics/owner?period=week|month|year
async fn owner_analytics(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<OwnerAnalytics>, AppError> {
    if !user.role.is_lister() {
        return Err(AppError::Authorization(
            "Listing owner access required".to_string(),
        ));
    }

    let period = query.parse()?;
    let analytics = state
        .analytics
        .owner_dashboard(user.id, period, Utc::now())
        .await.map_err(AppError::from_repo)?;
    Ok(Json(analytics))
}
