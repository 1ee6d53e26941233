//! Account management and money movement routes.
//!
//! Every money movement commits in the database first; the banking check
//! is written afterwards and can never undo the mutation.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info, warn};

use super::engine_error_response;
use crate::AppState;
use kassa_core::engine::{AccountSnapshot, EngineError};
use kassa_core::reports::{ReceiptData, Statement, StatementEntry, compute_totals};
use kassa_db::entities::sea_orm_active_enums::TransactionType;
use kassa_db::entities::{accounts, transactions};
use kassa_db::repositories::CreateAccountInput;
use kassa_shared::{PageRequest, PageResponse};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{account}", get(get_account))
        .route("/accounts/{account}", delete(delete_account))
        .route("/accounts/{account}/withdraw", put(withdraw))
        .route("/accounts/{account}/deposit", put(deposit))
        .route("/accounts/{account}/transfer/{receiver}", put(transfer))
        .route("/accounts/{account}/transactions", get(list_account_transactions))
        .route("/accounts/{account}/statement", get(account_statement))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account number (exactly 16 ASCII digits).
    pub number: String,
    /// Currency code, e.g. `USD`.
    pub currency: String,
    /// Owning user id.
    pub user_id: i64,
    /// Holding bank id.
    pub bank_id: i64,
    /// Opening balance; zero when omitted.
    pub balance: Option<Decimal>,
}

/// Query parameters for money movement endpoints.
#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    /// Amount as a decimal string.
    pub amount: String,
}

/// Query parameters for the period listing.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Period start (YYYY-MM-DD).
    pub from: String,
    /// Period end (YYYY-MM-DD), inclusive.
    pub to: String,
}

/// Query parameters for the statement endpoint.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Period start (YYYY-MM-DD).
    pub from: String,
    /// Period end (YYYY-MM-DD), inclusive.
    pub to: String,
    /// When true, the statement carries the income/outcome totals.
    #[serde(default)]
    pub totals: bool,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account id.
    pub id: i64,
    /// Account number.
    pub number: String,
    /// Current balance.
    pub balance: String,
    /// Currency code.
    pub currency: String,
    /// Owning user id.
    pub user_id: i64,
    /// Holding bank id.
    pub bank_id: i64,
    /// When the account was opened.
    pub created_date: String,
    /// Whether the account is active.
    pub active: bool,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            balance: model.balance.to_string(),
            currency: model.currency,
            user_id: model.user_id,
            bank_id: model.bank_id,
            created_date: model.created_date.to_rfc3339(),
            active: model.active,
        }
    }
}

/// Response for a transaction record.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction id.
    pub id: i64,
    /// Transaction type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Posted amount.
    pub amount: String,
    /// Currency the amount was posted in.
    pub currency: String,
    /// Debited account, when the type has a sender side.
    pub sender_account_id: Option<i64>,
    /// Credited account, when the type has a receiver side.
    pub receiver_account_id: Option<i64>,
    /// When the transaction was committed.
    pub created_date: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            kind: kind_code(&model.kind).to_string(),
            amount: model.amount.to_string(),
            currency: model.currency,
            sender_account_id: model.sender_account_id,
            receiver_account_id: model.receiver_account_id,
            created_date: model.created_date.to_rfc3339(),
        }
    }
}

/// Response for a withdrawal or deposit.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    /// Account after the write.
    pub account: AccountResponse,
    /// Appended transaction record.
    pub transaction: TransactionResponse,
}

/// Response for a transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Sender after the debit.
    pub sender: AccountResponse,
    /// Receiver after the credit.
    pub receiver: AccountResponse,
    /// Amount credited, in the receiver's currency.
    pub credited: String,
    /// Appended transaction record.
    pub transaction: TransactionResponse,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts` - List active accounts, paginated.
async fn list_accounts(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.account_repository().list(&page).await {
        Ok((items, total)) => {
            let data: Vec<AccountResponse> = items.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(PageResponse::new(data, &page, total))).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// POST `/accounts` - Open an account at a known bank for a known user.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let input = CreateAccountInput {
        number: payload.number,
        currency: payload.currency,
        user_id: payload.user_id,
        bank_id: payload.bank_id,
        balance: payload.balance,
    };
    match state.account_repository().create(input).await {
        Ok(account) => (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response(),
        Err(err) => engine_error_response(&err),
    }
}

/// GET `/accounts/{account}` - Fetch one account by record id.
async fn get_account(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.account_repository().find_by_id(id).await {
        Ok(Some(account)) => {
            (StatusCode::OK, Json(AccountResponse::from(account))).into_response()
        }
        Ok(None) => engine_error_response(&EngineError::NotFound(format!("account {id}"))),
        Err(err) => engine_error_response(&err),
    }
}

/// DELETE `/accounts/{account}` - Soft-delete a home-bank account by record id.
async fn delete_account(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.account_repository().soft_delete(id).await {
        Ok(account) => {
            info!(id, number = %account.number, "account deleted (deactivated)");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// PUT `/accounts/{account}/withdraw?amount=` - Withdraw cash from an account.
async fn withdraw(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<AmountQuery>,
) -> impl IntoResponse {
    let amount = match parse_amount(&query.amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    match state.account_repository().withdraw(&number, amount).await {
        Ok(outcome) => {
            write_receipt(&state, &outcome.transaction, Some(&outcome.account.number), None);
            let response = MutationResponse {
                account: outcome.account.into(),
                transaction: outcome.transaction.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// PUT `/accounts/{account}/deposit?amount=` - Put cash onto an account.
async fn deposit(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<AmountQuery>,
) -> impl IntoResponse {
    let amount = match parse_amount(&query.amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    match state.account_repository().deposit(&number, amount).await {
        Ok(outcome) => {
            write_receipt(&state, &outcome.transaction, None, Some(&outcome.account.number));
            let response = MutationResponse {
                account: outcome.account.into(),
                transaction: outcome.transaction.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// PUT `/accounts/{account}/transfer/{receiver}?amount=` - Move money between
/// two accounts, converting when their currencies differ.
async fn transfer(
    State(state): State<AppState>,
    Path((number, receiver_number)): Path<(String, String)>,
    Query(query): Query<AmountQuery>,
) -> impl IntoResponse {
    let amount = match parse_amount(&query.amount) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    match state
        .account_repository()
        .transfer(&number, &receiver_number, amount)
        .await
    {
        Ok(outcome) => {
            write_receipt(
                &state,
                &outcome.transaction,
                Some(&outcome.sender.number),
                Some(&outcome.receiver.number),
            );
            let response = TransferResponse {
                sender: outcome.sender.into(),
                receiver: outcome.receiver.into(),
                credited: outcome.credited.to_string(),
                transaction: outcome.transaction.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// GET `/accounts/{account}/transactions?from=&to=` - List the transactions
/// touching an account in a closed date period, oldest first.
///
/// The account may be deleted; its history stays readable.
async fn list_account_transactions(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let (from, to) = match parse_period(&query.from, &query.to) {
        Ok(period) => period,
        Err(response) => return response,
    };
    match state
        .transaction_repository()
        .find_for_account_in_period(&number, from, to)
        .await
    {
        Ok((account, transactions)) => {
            let items: Vec<TransactionResponse> =
                transactions.into_iter().map(Into::into).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "account": AccountResponse::from(account),
                    "transactions": items,
                })),
            )
                .into_response()
        }
        Err(err) => engine_error_response(&err),
    }
}

/// GET `/accounts/{account}/statement?from=&to=&totals=` - Generate a
/// statement document for the period and answer it as plain text.
///
/// `totals=true` upgrades the account statement to a money statement with
/// the income/outcome aggregates in the account currency.
async fn account_statement(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<StatementQuery>,
) -> impl IntoResponse {
    let (from, to) = match parse_period(&query.from, &query.to) {
        Ok(period) => period,
        Err(response) => return response,
    };
    let history = match state
        .transaction_repository()
        .account_history(&number, from, to)
        .await
    {
        Ok(history) => history,
        Err(err) => return engine_error_response(&err),
    };

    let entries: Vec<StatementEntry> = history
        .transactions
        .iter()
        .map(|record| StatementEntry {
            kind: record.kind.clone().into(),
            amount: record.amount,
            currency: record.currency.clone(),
            sender_account_id: record.sender_account_id,
            receiver_account_id: record.receiver_account_id,
            created_date: record.created_date.with_timezone(&Utc),
        })
        .collect();

    let totals = if query.totals {
        let snapshot = AccountSnapshot {
            id: history.account.id,
            number: history.account.number.clone(),
            balance: history.account.balance,
            currency: history.account.currency.clone(),
            user_id: history.account.user_id,
            bank_id: history.account.bank_id,
            active: history.account.active,
        };
        match compute_totals(&snapshot, &entries, &state.rates) {
            Ok(totals) => Some(totals),
            Err(err) => return engine_error_response(&err),
        }
    } else {
        None
    };

    let statement = Statement {
        bank_name: history.bank.name,
        client_name: format!("{} {}", history.user.name, history.user.surname),
        account_number: history.account.number,
        currency: history.account.currency,
        account_created: history.account.created_date.with_timezone(&Utc),
        period: (from, to),
        generated_at: Utc::now(),
        entries,
        totals,
    };

    match state.statements.write(&statement) {
        Ok(written) => {
            info!(
                number = written.number,
                account = %statement.account_number,
                "statement written"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                written.text,
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "statement could not be written");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "REPORT_ERROR",
                    "message": "statement could not be written",
                })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses a decimal amount, answering 400 on malformed input.
fn parse_amount(raw: &str) -> Result<Decimal, Response> {
    Decimal::from_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "VALIDATION_ERROR",
                "message": format!("amount {raw:?} is not a decimal number"),
            })),
        )
            .into_response()
    })
}

/// Parses the `from`/`to` pair of a period query, answering 400 on
/// malformed dates.
fn parse_period(from: &str, to: &str) -> Result<(NaiveDate, NaiveDate), Response> {
    Ok((parse_date(from)?, parse_date(to)?))
}

fn parse_date(raw: &str) -> Result<NaiveDate, Response> {
    NaiveDate::from_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "VALIDATION_ERROR",
                "message": format!("date {raw:?} is not a YYYY-MM-DD date"),
            })),
        )
            .into_response()
    })
}

/// Writes the banking check for a committed mutation.
///
/// The mutation is already committed; a check that cannot be written is
/// logged and the request still succeeds.
fn write_receipt(
    state: &AppState,
    transaction: &transactions::Model,
    sender_number: Option<&str>,
    receiver_number: Option<&str>,
) {
    let data = ReceiptData {
        kind: transaction.kind.clone().into(),
        amount: transaction.amount,
        currency: transaction.currency.clone(),
        sender_number: sender_number.map(str::to_string),
        receiver_number: receiver_number.map(str::to_string),
        created_at: transaction.created_date.with_timezone(&Utc),
    };
    match state.receipts.write(&data) {
        Ok(written) => info!(number = written.number, "check written"),
        Err(err) => warn!(error = %err, "check could not be written"),
    }
}

/// Wire name for a transaction type.
fn kind_code(kind: &TransactionType) -> &'static str {
    match kind {
        TransactionType::Withdraw => "withdraw",
        TransactionType::Refill => "refill",
        TransactionType::Transfer => "transfer",
    }
}
