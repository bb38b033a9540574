use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::demo_control::{DemoControl, FeatureAction};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManageFeatureRequest {
    /// `apply` or `revert`
    #[schema(value_type = String, example = "apply")]
    pub action: FeatureAction,
    #[schema(example = "discount-feature")]
    pub feature_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchDbRequest {
    pub main_connection_string: String,
    pub shadow_connection_string: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedResponse {
    message: &'static str,
    categories_created: usize,
    products_created: usize,
}

/// GET /demo-control/status
///
/// Reports the database URLs configured in the env file.
#[utoipa::path(
    get,
    path = "/demo-control/status",
    responses(
        (status = 200, description = "Configured database connection"),
        (status = 500, description = "Env file could not be parsed"),
    ),
    tag = "demo-control"
)]
pub async fn status(control: web::Data<DemoControl>) -> Result<HttpResponse, AppError> {
    let status = web::block(move || control.status()).await??;
    Ok(HttpResponse::Ok().json(status))
}

#[utoipa::path(
    get,
    path = "/demo-control/feature-status/{name}",
    params(
        ("name" = String, Path, description = "Feature name"),
    ),
    responses(
        (status = 200, description = "Whether the feature is applied"),
        (status = 400, description = "Invalid feature name"),
    ),
    tag = "demo-control"
)]
pub async fn feature_status(
    control: web::Data<DemoControl>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let status = control.feature_status(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(status))
}

/// POST /demo-control/manage-feature
///
/// Applies or reverts a demo feature through `demo-manager.sh`.
#[utoipa::path(
    post,
    path = "/demo-control/manage-feature",
    request_body = ManageFeatureRequest,
    responses(
        (status = 200, description = "Script finished; output included"),
        (status = 400, description = "Invalid action or feature name"),
        (status = 500, description = "Script failed"),
    ),
    tag = "demo-control"
)]
pub async fn manage_feature(
    control: web::Data<DemoControl>,
    body: web::Json<ManageFeatureRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let report = control
        .manage_feature(body.action, &body.feature_name)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /demo-control/switch-db
///
/// Rewrites the database connection strings. The backend must be restarted
/// to pick them up.
#[utoipa::path(
    post,
    path = "/demo-control/switch-db",
    request_body = SwitchDbRequest,
    responses(
        (status = 200, description = "Connection strings updated"),
        (status = 400, description = "Missing main connection string"),
        (status = 500, description = "Script failed"),
    ),
    tag = "demo-control"
)]
pub async fn switch_db(
    control: web::Data<DemoControl>,
    body: web::Json<SwitchDbRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let report = control
        .switch_db(
            &body.main_connection_string,
            body.shadow_connection_string.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /demo-control/run-seed
///
/// Loads the demo catalog. Refused with 400 when products already exist.
#[utoipa::path(
    post,
    path = "/demo-control/run-seed",
    responses(
        (status = 200, description = "Catalog seeded"),
        (status = 400, description = "Catalog is not empty"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "demo-control"
)]
pub async fn run_seed(control: web::Data<DemoControl>) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || control.run_seed()).await??;
    Ok(HttpResponse::Ok().json(SeedResponse {
        message: "Seed completed successfully.",
        categories_created: summary.categories_created,
        products_created: summary.products_created,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn manage_feature_request_uses_camel_case() {
        let req: ManageFeatureRequest =
            serde_json::from_value(json!({"action": "revert", "featureName": "x"})).unwrap();

        assert_eq!(req.action, FeatureAction::Revert);
        assert_eq!(req.feature_name, "x");
    }

    #[test]
    fn unknown_action_is_rejected() {
        let res: Result<ManageFeatureRequest, _> =
            serde_json::from_value(json!({"action": "delete", "featureName": "x"}));
        assert!(res.is_err());
    }
}
