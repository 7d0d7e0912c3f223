//! Route handlers. Each maps request parameters onto [`crate::facade::Indexer`]
//! operations and the facade/domain error hierarchy onto HTTP responses via
//! [`crate::error::ApiError`].

use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, DomainError};
use crate::facade::Refresh;
use crate::http::AppState;

fn iso8601(ts: u64) -> String {
    Utc.timestamp_opt(i64::try_from(ts).unwrap_or(0), 0)
        .single()
        .map_or_else(String::new, |dt| dt.to_rfc3339())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    ok: bool,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.indexer.decimals().await?;
    Ok(Json(HealthResponse { ok: true }))
}

#[derive(Debug, Deserialize)]
pub struct GetBalanceQuery {
    address: String,
    #[serde(default)]
    human: Option<String>,
}

fn truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

#[derive(Debug, Serialize)]
pub struct GetBalanceResponse {
    balance: String,
}

pub async fn get_balance(
    State(state): State<AppState>,
    Query(q): Query<GetBalanceQuery>,
) -> Result<Json<GetBalanceResponse>, ApiError> {
    let raw = state.indexer.balance(&q.address).await?;
    let balance = if truthy(q.human.as_deref()) {
        let decimals = state.indexer.decimals().await?;
        let symbol = state.indexer.symbol().await.unwrap_or_default();
        format!("{} {}", human_amount(raw, decimals), symbol)
    } else {
        raw.to_string()
    };
    Ok(Json(GetBalanceResponse { balance }))
}

#[derive(Debug, Deserialize)]
pub struct GetBalanceBatchRequest {
    addresses: Vec<String>,
    #[serde(default)]
    human: bool,
}

#[derive(Debug, Serialize)]
pub struct BalanceEntry {
    address: String,
    balance: String,
}

#[derive(Debug, Serialize)]
pub struct GetBalanceBatchResponse {
    balances: Vec<BalanceEntry>,
}

pub async fn get_balance_batch(
    State(state): State<AppState>,
    Json(req): Json<GetBalanceBatchRequest>,
) -> Result<Json<GetBalanceBatchResponse>, ApiError> {
    let decimals = if req.human { Some(state.indexer.decimals().await?) } else { None };
    let symbol = if req.human { state.indexer.symbol().await.unwrap_or_default() } else { String::new() };

    let mut balances = Vec::with_capacity(req.addresses.len());
    for address in &req.addresses {
        let raw = state.indexer.balance(address).await?;
        let balance = match decimals {
            Some(d) => format!("{} {symbol}", human_amount(raw, d)),
            None => raw.to_string(),
        };
        balances.push(BalanceEntry { address: address.clone(), balance });
    }
    Ok(Json(GetBalanceBatchResponse { balances }))
}

#[derive(Debug, Serialize)]
pub struct TokenInfoResponse {
    address: String,
    symbol: String,
    decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "totalSupply_raw")]
    total_supply_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "totalSupply_human")]
    total_supply_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

pub async fn get_token_info(State(state): State<AppState>) -> Result<Json<TokenInfoResponse>, ApiError> {
    let decimals = state.indexer.decimals().await?;
    let symbol = state.indexer.symbol().await.unwrap_or_default();
    let name = state.indexer.name().await.ok();
    let total_supply = state.indexer.total_supply().await.ok();

    Ok(Json(TokenInfoResponse {
        address: state.indexer.token_address_display(),
        symbol,
        decimals,
        total_supply_raw: total_supply.map(|v| v.to_string()),
        total_supply_human: total_supply.map(|v| human_amount(v, decimals)),
        name,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    api_key: Option<String>,
    start: Option<u64>,
    #[serde(default = "default_offset")]
    offset: u32,
    #[serde(default = "default_sleep")]
    sleep: f64,
}

const fn default_offset() -> u32 {
    2000
}

const fn default_sleep() -> f64 {
    0.25
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    ok: bool,
    last_scanned_block: u64,
}

pub async fn bootstrap(
    State(state): State<AppState>,
    Json(req): Json<BootstrapRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    if req.api_key.is_none() && !state.indexer.has_configured_api_key() {
        return Err(crate::error::AppError::from(DomainError::MissingApiKey).into());
    }
    let sleep = Duration::from_secs_f64(req.sleep.max(0.0));
    let last_scanned_block = state
        .indexer
        .bootstrap(req.api_key.as_deref(), req.start, req.offset, sleep)
        .await?;
    Ok(Json(ScanResponse { ok: true, last_scanned_block }))
}

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    start: Option<u64>,
    #[serde(default = "default_offset")]
    batch: u32,
    #[serde(default = "default_conf")]
    conf: u64,
}

const fn default_conf() -> u64 {
    20
}

pub async fn index(
    State(state): State<AppState>,
    Json(req): Json<IndexRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let last_scanned_block = state.indexer.scan(req.start, u64::from(req.batch), req.conf).await?;
    Ok(Json(ScanResponse { ok: true, last_scanned_block }))
}

#[derive(Debug, Deserialize)]
pub struct GetTopQuery {
    n: u32,
    #[serde(default)]
    update: Option<String>,
    api_key: Option<String>,
}

fn parse_refresh(update: Option<&str>) -> Refresh {
    match update {
        Some("scan") => Refresh::Explorer,
        _ => Refresh::Rpc,
    }
}

#[derive(Debug, Serialize)]
pub struct TopEntry {
    address: String,
    balance: String,
}

#[derive(Debug, Serialize)]
pub struct GetTopResponse {
    top: Vec<TopEntry>,
}

pub async fn get_top(
    State(state): State<AppState>,
    Query(q): Query<GetTopQuery>,
) -> Result<Json<GetTopResponse>, ApiError> {
    let refresh = parse_refresh(q.update.as_deref());
    let holders = state.indexer.top_n(q.n, refresh, q.api_key.as_deref()).await?;
    Ok(Json(GetTopResponse {
        top: holders
            .into_iter()
            .map(|h| TopEntry { address: h.address, balance: h.balance_human })
            .collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct TopWithTxEntry {
    address: String,
    balance: String,
    symbol: String,
    last_tx: String,
}

#[derive(Debug, Serialize)]
pub struct GetTopWithTxResponse {
    top: Vec<TopWithTxEntry>,
}

pub async fn get_top_with_transactions(
    State(state): State<AppState>,
    Query(q): Query<GetTopQuery>,
) -> Result<Json<GetTopWithTxResponse>, ApiError> {
    let refresh = parse_refresh(q.update.as_deref());
    let holders = state.indexer.top_n(q.n, refresh, q.api_key.as_deref()).await?;
    let symbol = state.indexer.symbol().await.unwrap_or_default();
    Ok(Json(GetTopWithTxResponse {
        top: holders
            .into_iter()
            .map(|h| TopWithTxEntry {
                address: h.address,
                balance: h.balance_human,
                symbol: symbol.clone(),
                last_tx: iso8601(h.last_tx_ts),
            })
            .collect(),
    }))
}

fn human_amount(raw: alloy::primitives::U256, decimals: u8) -> String {
    crate::facade::Indexer::format_human(raw, decimals)
}
