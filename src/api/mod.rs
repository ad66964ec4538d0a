use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AnnualInterestRow, BalancePoint, INTEREST_DEDUCTION_RATE, LoanBreakdown, LoanInputs,
    MAX_TERM_YEARS, PaymentRow, ScheduleOutcome, compute_loan_breakdown,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiOutcome {
    Repayment,
    NoLoan,
    ImmediatePayoff,
    UnstablePayment,
}

impl From<ScheduleOutcome> for ApiOutcome {
    fn from(value: ScheduleOutcome) -> Self {
        match value {
            ScheduleOutcome::Repayment => ApiOutcome::Repayment,
            ScheduleOutcome::NoLoan => ApiOutcome::NoLoan,
            ScheduleOutcome::ImmediatePayoff => ApiOutcome::ImmediatePayoff,
            ScheduleOutcome::UnstablePayment => ApiOutcome::UnstablePayment,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    #[serde(alias = "su_loan_amount", alias = "loanAmount")]
    su_loan_amount: Option<f64>,
    #[serde(alias = "extraDeposit", alias = "extra_deposit")]
    deposit: Option<f64>,
    #[serde(alias = "interestRate", alias = "interest_rate_percent")]
    interest_rate_percent: Option<f64>,
    #[serde(alias = "loanTerm", alias = "loan_term_years")]
    loan_term_years: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "sulaan",
    about = "SU loan repayment calculator (amortization schedule + interest deduction)"
)]
struct Cli {
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "SU loan amount in kr. before any extraordinary deposit"
    )]
    su_loan_amount: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Extraordinary deposit subtracted from the loan amount"
    )]
    deposit: f64,
    #[arg(long, default_value_t = 3.75, help = "Annual interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 10, help = "Repayment term in years (0-15)")]
    loan_term_years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    outcome: ApiOutcome,
    message: Option<&'static str>,
    loan_amount: f64,
    monthly_payment: f64,
    total_payments: f64,
    total_interest: f64,
    scheduled_interest: f64,
    scheduled_deduction: f64,
    deduction_rate: f64,
    schedule: Vec<PaymentRow>,
    annual_summary: Vec<AnnualInterestRow>,
    balance_curve: Vec<BalancePoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<LoanInputs, String> {
    if !cli.su_loan_amount.is_finite() || cli.su_loan_amount < 0.0 {
        return Err("--su-loan-amount must be >= 0".to_string());
    }

    if !cli.deposit.is_finite() || cli.deposit < 0.0 {
        return Err("--deposit must be >= 0".to_string());
    }

    if !cli.interest_rate.is_finite() || cli.interest_rate < 0.0 {
        return Err("--interest-rate must be >= 0".to_string());
    }

    if cli.loan_term_years > MAX_TERM_YEARS {
        return Err(format!(
            "--loan-term-years must be between 0 and {MAX_TERM_YEARS}"
        ));
    }

    Ok(LoanInputs {
        principal: cli.su_loan_amount,
        extra_deposit: cli.deposit,
        annual_rate_percent: cli.interest_rate,
        term_years: cli.loan_term_years,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("SU loan calculator listening on http://{addr}");
    println!("SU-Lånberegner listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(payload): Query<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

async fn calculate_post_handler(Json(payload): Json<CalculatePayload>) -> Response {
    calculate_handler_impl(payload)
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            log::debug!("rejected calculate request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let breakdown = compute_loan_breakdown(&inputs);
    if breakdown.outcome == ScheduleOutcome::UnstablePayment {
        log::warn!(
            "amortization formula unstable for loan={} rate={}% term={}y; payment forced to 0",
            breakdown.loan_amount,
            inputs.annual_rate_percent,
            inputs.term_years
        );
    }

    json_response(StatusCode::OK, build_calculate_response(breakdown))
}

fn inputs_from_payload(payload: CalculatePayload) -> Result<LoanInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.su_loan_amount {
        cli.su_loan_amount = v;
    }
    if let Some(v) = payload.deposit {
        cli.deposit = v;
    }
    if let Some(v) = payload.interest_rate_percent {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        su_loan_amount: 100_000.0,
        deposit: 0.0,
        interest_rate: 3.75,
        loan_term_years: 10,
    }
}

/// Status text shown above the metrics; wording follows the original
/// Danish application.
fn outcome_message(outcome: ScheduleOutcome) -> Option<&'static str> {
    match outcome {
        ScheduleOutcome::Repayment => None,
        ScheduleOutcome::NoLoan => Some(
            "Lånebeløb (efter evt. ekstraordinært afdrag) er 0 kr. eller mindre. \
             Ingen beregning nødvendig.",
        ),
        ScheduleOutcome::ImmediatePayoff => {
            Some("Lånet tilbagebetales med det samme (0 års løbetid).")
        }
        ScheduleOutcome::UnstablePayment => Some(
            "Der opstod en fejl ved beregning af månedlig ydelse. Kontroller \
             inputværdier (f.eks. meget lav rente og lang løbetid kan give problemer).",
        ),
    }
}

fn build_calculate_response(breakdown: LoanBreakdown) -> CalculateResponse {
    CalculateResponse {
        outcome: breakdown.outcome.into(),
        message: outcome_message(breakdown.outcome),
        loan_amount: breakdown.loan_amount,
        monthly_payment: breakdown.monthly_payment,
        total_payments: breakdown.total_payments,
        total_interest: breakdown.total_interest,
        scheduled_interest: breakdown.scheduled_interest,
        scheduled_deduction: breakdown.scheduled_deduction,
        deduction_rate: INTEREST_DEDUCTION_RATE,
        schedule: breakdown.schedule,
        annual_summary: breakdown.annual_summary,
        balance_curve: breakdown.balance_curve,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<LoanInputs, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}
