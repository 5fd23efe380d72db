//! HTTP API over a shared treasury.
//!
//! Every write takes the ledger's write lock for the whole operation, so
//! operations are applied one at a time. The caller is an explicit field
//! of each request body.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fund_ledger::{Ballot, Fund, FundError, FundEvent, SpendingRequest, Transfer};
use fund_types::{Address, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;

pub type ApiResult<T> = Result<T, ApiError>;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub fund: Arc<RwLock<Fund>>,
    pub metrics: Arc<Metrics>,
}

impl ApiState {
    pub fn new(fund: Fund, metrics: Arc<Metrics>) -> Self {
        metrics.observe_fund(&fund);
        Self {
            fund: Arc::new(RwLock::new(fund)),
            metrics,
        }
    }

    fn rejected(&self, operation: &str, err: FundError) -> ApiError {
        self.metrics.record_rejection(operation, err.kind());
        ApiError::Fund(err)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Fund(#[from] FundError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// HTTP status for a ledger rejection.
pub fn fund_status(err: &FundError) -> StatusCode {
    match err {
        FundError::NotAdmin(_) | FundError::NotStakeholder(_) => StatusCode::FORBIDDEN,
        FundError::NotFound { .. } => StatusCode::NOT_FOUND,
        FundError::DoubleVote { .. }
        | FundError::AlreadyExecuted(_)
        | FundError::QuorumNotMet(_) => StatusCode::CONFLICT,
        FundError::AmountMismatch { .. }
        | FundError::BelowMinimum { .. }
        | FundError::InsufficientBalance { .. }
        | FundError::ArithmeticOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FundError::InvalidConfig(_) | FundError::Shares(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Fund(err) => (fund_status(&err), err.kind(), err.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = Json(json!({
            "error": error_type,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub participant: Address,
    pub amount: U256,
    pub paid: U256,
}

#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub participant: Address,
    pub weight: U256,
    pub total_stake: U256,
}

#[derive(Debug, Deserialize)]
pub struct CreateSpendingRequest {
    pub caller: Address,
    pub recipient: Address,
    pub amount: U256,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSpendingResponse {
    pub index: u64,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub caller: Address,
    pub approve: bool,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub index: u64,
    pub approved: bool,
    pub yes_weight: U256,
    pub total_stake: U256,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub caller: Address,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StakeResponse {
    pub address: Address,
    pub weight: U256,
    pub shares: U256,
    pub is_stakeholder: bool,
}

#[derive(Debug, Serialize)]
pub struct FundInfo {
    pub address: Address,
    pub admin: Address,
    pub min_deposit: U256,
    pub quorum_percent: u8,
    pub balance: U256,
    pub total_stake: U256,
    pub stakeholders: usize,
    pub spending_count: u64,
    pub share_name: String,
    pub share_symbol: String,
    pub share_supply: U256,
}

/// Build the router. `/metrics` is mounted only when `expose_metrics` is set.
pub fn router(state: ApiState, cors: bool, expose_metrics: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/api/fund", get(fund_info))
        .route("/api/deposit", post(deposit))
        .route("/api/stake/:address", get(stake))
        .route("/api/spending", post(create_spending).get(list_spending))
        .route("/api/spending/:index", get(get_spending))
        .route("/api/spending/:index/vote", post(vote))
        .route("/api/spending/:index/execute", post(execute))
        .route("/api/events", get(events));

    if expose_metrics {
        app = app.route("/metrics", get(export_metrics));
    }

    let app = app.with_state(state).layer(TraceLayer::new_for_http());

    if cors {
        let layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
        app.layer(layer)
    } else {
        app
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn fund_info(State(state): State<ApiState>) -> Json<FundInfo> {
    let fund = state.fund.read();
    Json(FundInfo {
        address: fund.address(),
        admin: fund.admin(),
        min_deposit: fund.min_deposit(),
        quorum_percent: fund.quorum_percent(),
        balance: fund.balance(),
        total_stake: fund.total_stake(),
        stakeholders: fund.stakeholder_count(),
        spending_count: fund.spending_count(),
        share_name: fund.shares().name().to_string(),
        share_symbol: fund.shares().symbol().to_string(),
        share_supply: fund.shares().total_supply(),
    })
}

async fn deposit(
    State(state): State<ApiState>,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> ApiResult<Json<DepositResponse>> {
    let Json(req) = payload?;
    let mut fund = state.fund.write();

    let weight = fund
        .deposit(req.participant, req.amount, req.paid)
        .map_err(|e| state.rejected("deposit", e))?;

    state.metrics.deposits.inc();
    state.metrics.observe_fund(&fund);

    Ok(Json(DepositResponse {
        participant: req.participant,
        weight,
        total_stake: fund.total_stake(),
    }))
}

async fn stake(
    State(state): State<ApiState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<StakeResponse>> {
    let Path(raw) = path?;
    let address = Address::from_str(&raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let fund = state.fund.read();
    Ok(Json(StakeResponse {
        address,
        weight: fund.stake_of(&address),
        shares: fund.shares().balance_of(&address),
        is_stakeholder: fund.is_stakeholder(&address),
    }))
}

async fn create_spending(
    State(state): State<ApiState>,
    payload: Result<Json<CreateSpendingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateSpendingResponse>)> {
    let Json(req) = payload?;
    let mut fund = state.fund.write();

    let index = fund
        .create_spending(req.caller, req.recipient, req.amount, req.description)
        .map_err(|e| state.rejected("create_spending", e))?;

    state.metrics.spending_requests.inc();
    Ok((StatusCode::CREATED, Json(CreateSpendingResponse { index })))
}

async fn list_spending(
    State(state): State<ApiState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<SpendingRequest>>> {
    let Query(params) = params?;
    let fund = state.fund.read();
    let page = fund.spendings(params.start.unwrap_or(0), params.end.unwrap_or(u64::MAX));
    Ok(Json(page.to_vec()))
}

async fn get_spending(
    State(state): State<ApiState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<SpendingRequest>> {
    let Path(index) = path?;
    let fund = state.fund.read();
    let request = fund
        .spending(index)
        .map_err(|e| state.rejected("get_spending", e))?;
    Ok(Json(request.clone()))
}

async fn vote(
    State(state): State<ApiState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteResponse>> {
    let Path(index) = path?;
    let Json(req) = payload?;
    let mut fund = state.fund.write();

    let approved = fund
        .approve_spending(req.caller, index, Ballot::from(req.approve))
        .map_err(|e| state.rejected("approve_spending", e))?;
    state.metrics.votes.inc();

    let yes_weight = fund.spending(index)?.yes_weight;
    Ok(Json(VoteResponse {
        index,
        approved,
        yes_weight,
        total_stake: fund.total_stake(),
    }))
}

async fn execute(
    State(state): State<ApiState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<Json<Transfer>> {
    let Path(index) = path?;
    let Json(req) = payload?;
    let mut fund = state.fund.write();

    let transfer = fund
        .execute_spending(req.caller, index)
        .map_err(|e| state.rejected("execute_spending", e))?;

    state.metrics.executions.inc();
    state.metrics.observe_fund(&fund);
    Ok(Json(transfer))
}

async fn events(State(state): State<ApiState>) -> Json<Vec<FundEvent>> {
    Json(state.fund.read().events().to_vec())
}

async fn export_metrics(State(state): State<ApiState>) -> ApiResult<String> {
    state
        .metrics
        .export()
        .map_err(|e| ApiError::Internal(e.to_string()))
}
