//! REST surface for the warranty registry.
//!
//! Thin handlers: each one maps the public DTO to a domain command, invokes
//! the matching service, and maps the typed domain error onto an HTTP status.
//! Authentication happens upstream; the trusted identity arrives as
//! `x-user-id` / `x-user-email` / `x-user-name` headers set by the auth
//! layer, and is absent on the public verification route.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::verify::VerifyLookupQuery;
use crate::domain::commands::warranty::{
    ClaimWarrantyCommand, IssueWarrantyCommand, ReleaseWarrantyCommand,
    SelfDeclareWarrantyCommand,
};
use crate::domain::expiry::CoverageTerms;
use crate::domain::models::principal::Principal;
use crate::domain::models::warranty::WarrantyValidationError;
use crate::domain::{VerificationService, WarrantyError, WarrantyService};
use crate::io::mappers;
use crate::storage::sqlite::{DbConnection, WarrantyRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub warranty_service: WarrantyService<WarrantyRepository>,
    pub verification_service: VerificationService<WarrantyRepository>,
}

impl AppState {
    /// Create application state over a database connection
    pub fn new(db: DbConnection) -> Self {
        let repository = Arc::new(WarrantyRepository::new(db));
        Self {
            warranty_service: WarrantyService::new(repository.clone()),
            verification_service: VerificationService::new(repository),
        }
    }
}

/// Build the `/api` router
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/warranties", post(issue_warranty))
        .route("/warranties/claim", post(claim_warranty))
        .route("/warranties/manual", post(self_declare_warranty))
        .route("/warranties/mine", get(list_mine))
        .route("/warranties/issued", get(list_issued))
        .route("/warranties/:id", get(get_warranty))
        .route("/warranties/:id/release", post(release_warranty))
        .route("/verify", get(verify_warranty))
        .with_state(state)
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty())
        };
        match (header("x-user-id"), header("x-user-email")) {
            (Some(uid), Some(email)) => Ok(Principal {
                uid,
                email,
                display_name: header("x-user-name"),
            }),
            _ => Err((StatusCode::UNAUTHORIZED, "Missing authenticated identity")),
        }
    }
}

/// Map a domain error onto an HTTP status plus user-facing message.
/// Transient failures are logged and collapsed into a generic message.
fn error_response(err: WarrantyError) -> (StatusCode, String) {
    match &err {
        WarrantyError::Validation(_) | WarrantyError::NotTransferable => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        WarrantyError::CodeNotFound | WarrantyError::NotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        WarrantyError::AlreadyClaimed => (StatusCode::CONFLICT, err.to_string()),
        WarrantyError::NotOwner => (StatusCode::FORBIDDEN, err.to_string()),
        WarrantyError::CodeSpaceExhausted | WarrantyError::Storage(_) => {
            tracing::error!("Warranty operation failed: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.".to_string(),
            )
        }
    }
}

/// Axum handler for POST /api/warranties (seller issue)
pub async fn issue_warranty(
    State(state): State<AppState>,
    seller: Principal,
    Json(request): Json<shared::IssueWarrantyRequest>,
) -> impl IntoResponse {
    info!("POST /api/warranties - product: {}", request.product_model);

    let purchase_date = match mappers::parse_request_date(&request.purchase_date) {
        Ok(date) => date,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let command = IssueWarrantyCommand {
        seller,
        customer_name: request.customer_name,
        customer_phone: request.customer_phone,
        product_model: request.product_model,
        serial_number: request.serial_number,
        purchase_date,
        duration_months: request.duration_months,
    };

    match state.warranty_service.issue_warranty(command).await {
        Ok(result) => {
            let response = shared::IssueWarrantyResponse {
                warranty: mappers::to_warranty_dto(&result.warranty, Utc::now().date_naive()),
                success_message: result.success_message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Axum handler for POST /api/warranties/claim (buyer claim-by-code)
pub async fn claim_warranty(
    State(state): State<AppState>,
    buyer: Principal,
    Json(request): Json<shared::ClaimWarrantyRequest>,
) -> impl IntoResponse {
    info!("POST /api/warranties/claim");

    let purchase_date = match &request.purchase_date {
        Some(s) => match mappers::parse_request_date(s) {
            Ok(date) => Some(date),
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        },
        None => None,
    };

    let command = ClaimWarrantyCommand {
        buyer,
        code: request.code,
        purchase_date,
    };

    match state.warranty_service.claim_warranty(command).await {
        Ok(result) => {
            let response = shared::ClaimWarrantyResponse {
                warranty: mappers::to_warranty_dto(&result.warranty, Utc::now().date_naive()),
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Axum handler for POST /api/warranties/manual (buyer self-declare)
pub async fn self_declare_warranty(
    State(state): State<AppState>,
    buyer: Principal,
    Json(request): Json<shared::SelfDeclareWarrantyRequest>,
) -> impl IntoResponse {
    info!("POST /api/warranties/manual - product: {}", request.product_model);

    let purchase_date = match mappers::parse_request_date(&request.purchase_date) {
        Ok(date) => date,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let terms = match (request.duration_months, request.custom_expiry_date.as_deref()) {
        (Some(months), _) => CoverageTerms::Duration(months),
        (None, Some(s)) => match mappers::parse_request_date(s) {
            Ok(date) => CoverageTerms::Custom(date),
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        },
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                WarrantyValidationError::MissingExpiryDate.to_string(),
            )
                .into_response()
        }
    };

    let command = SelfDeclareWarrantyCommand {
        buyer,
        product_model: request.product_model,
        brand: request.brand,
        serial_number: request.serial_number,
        seller_name: request.seller_name,
        notes: request.notes,
        purchase_date,
        terms,
    };

    match state.warranty_service.self_declare_warranty(command).await {
        Ok(result) => {
            let response = shared::SelfDeclareWarrantyResponse {
                warranty: mappers::to_warranty_dto(&result.warranty, Utc::now().date_naive()),
                success_message: result.success_message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Axum handler for POST /api/warranties/:id/release (owner transfer)
pub async fn release_warranty(
    State(state): State<AppState>,
    owner: Principal,
    Path(warranty_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/warranties/{}/release", warranty_id);

    let command = ReleaseWarrantyCommand { owner, warranty_id };
    match state.warranty_service.release_warranty(command).await {
        Ok(result) => {
            let response = shared::ReleaseWarrantyResponse {
                transfer_code: result.transfer_code,
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Axum handler for GET /api/warranties/mine (buyer dashboard)
pub async fn list_mine(State(state): State<AppState>, buyer: Principal) -> impl IntoResponse {
    info!("GET /api/warranties/mine - buyer: {}", buyer.uid);
    match state.warranty_service.list_for_buyer(&buyer).await {
        Ok(result) => list_response(result.warranties).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Axum handler for GET /api/warranties/issued (seller dashboard)
pub async fn list_issued(State(state): State<AppState>, seller: Principal) -> impl IntoResponse {
    info!("GET /api/warranties/issued - seller: {}", seller.uid);
    match state.warranty_service.list_for_seller(&seller).await {
        Ok(result) => list_response(result.warranties).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

fn list_response(
    warranties: Vec<crate::domain::models::warranty::Warranty>,
) -> (StatusCode, Json<shared::WarrantyListResponse>) {
    let today = Utc::now().date_naive();
    let response = shared::WarrantyListResponse {
        summary: mappers::summarize(&warranties, today),
        warranties: warranties
            .iter()
            .map(|w| mappers::to_warranty_dto(w, today))
            .collect(),
    };
    (StatusCode::OK, Json(response))
}

/// Axum handler for GET /api/warranties/:id (owner/seller detail view)
pub async fn get_warranty(
    State(state): State<AppState>,
    principal: Principal,
    Path(warranty_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/warranties/{}", warranty_id);

    match state
        .warranty_service
        .get_warranty_for_principal(&warranty_id, &principal)
        .await
    {
        Ok(result) => {
            let response = shared::WarrantyDetailResponse {
                warranty: mappers::to_warranty_dto(&result.warranty, Utc::now().date_naive()),
                history: result.history.iter().map(mappers::to_event_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// Query parameters for the public verification endpoint
#[derive(Deserialize, Debug)]
pub struct VerifyQueryParams {
    pub q: String,
}

/// Axum handler for GET /api/verify (public, unauthenticated)
pub async fn verify_warranty(
    State(state): State<AppState>,
    Query(params): Query<VerifyQueryParams>,
) -> impl IntoResponse {
    info!("GET /api/verify");

    match state
        .verification_service
        .lookup(VerifyLookupQuery { query: params.q })
        .await
    {
        Ok(result) => {
            let response = shared::VerifyResponse {
                result: result.as_ref().map(mappers::to_verified_dto),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("Error verifying warranty: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AppState::new(db)
    }

    fn seller() -> Principal {
        Principal {
            uid: "seller-1".to_string(),
            email: "shop@example.com".to_string(),
            display_name: Some("Example Electronics".to_string()),
        }
    }

    fn buyer() -> Principal {
        Principal {
            uid: "buyer-1".to_string(),
            email: "buyer@example.com".to_string(),
            display_name: None,
        }
    }

    fn issue_request() -> shared::IssueWarrantyRequest {
        shared::IssueWarrantyRequest {
            customer_name: "Rahim Ahmed".to_string(),
            customer_phone: "01700000000".to_string(),
            product_model: "Inverter AC 1.5T".to_string(),
            serial_number: "SN-REST-1".to_string(),
            purchase_date: "2025-06-01".to_string(),
            duration_months: 12,
        }
    }

    #[tokio::test]
    async fn test_issue_handler_returns_created() {
        let state = setup_test_state().await;

        let response = issue_warranty(State(state), seller(), Json(issue_request()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_issue_handler_rejects_bad_date() {
        let state = setup_test_state().await;

        let mut request = issue_request();
        request.purchase_date = "06/01/2025".to_string();
        let response = issue_warranty(State(state), seller(), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_claim_handler_not_found() {
        let state = setup_test_state().await;

        let response = claim_warranty(
            State(state),
            buyer(),
            Json(shared::ClaimWarrantyRequest {
                code: "CB-ZZZZ-9999".to_string(),
                purchase_date: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_claim_conflict_maps_to_409() {
        let state = setup_test_state().await;

        let issued = state
            .warranty_service
            .issue_warranty(IssueWarrantyCommand {
                seller: seller(),
                customer_name: "Rahim Ahmed".to_string(),
                customer_phone: "01700000000".to_string(),
                product_model: "Inverter AC 1.5T".to_string(),
                serial_number: "SN-REST-2".to_string(),
                purchase_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                duration_months: 12,
            })
            .await
            .expect("Failed to issue");
        let code = issued.warranty.code.unwrap();

        let first = claim_warranty(
            State(state.clone()),
            buyer(),
            Json(shared::ClaimWarrantyRequest {
                code: code.clone(),
                purchase_date: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(first.status(), StatusCode::OK);

        let second = claim_warranty(
            State(state),
            Principal {
                uid: "buyer-2".to_string(),
                email: "other@example.com".to_string(),
                display_name: None,
            },
            Json(shared::ClaimWarrantyRequest {
                code,
                purchase_date: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_self_declare_requires_terms() {
        let state = setup_test_state().await;

        let response = self_declare_warranty(
            State(state),
            buyer(),
            Json(shared::SelfDeclareWarrantyRequest {
                product_model: "TV".to_string(),
                brand: None,
                serial_number: None,
                seller_name: None,
                notes: None,
                purchase_date: "2025-06-01".to_string(),
                duration_months: None,
                custom_expiry_date: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_handler_is_public() {
        let state = setup_test_state().await;

        let response = verify_warranty(
            State(state),
            Query(VerifyQueryParams {
                q: "CB-ZZZZ-9999".to_string(),
            }),
        )
        .await
        .into_response();
        // unknown queries still return 200 with an empty result
        assert_eq!(response.status(), StatusCode::OK);
    }
}
