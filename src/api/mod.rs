use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CalendarMonth, Comparison, DEFAULT_MAX_MONTHS, Debt, DebtPayoff, DebtSummary,
    GoalSolveConfig, GoalSolveResult, MonthTracePoint, PayoffOutcome, SimulationConfig, Strategy,
    compare_strategies, compare_with_baseline, simulate_with_trace, solve_required_extra,
    validate_config, validate_debts, validate_extra,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStrategy {
    Snowball,
    Avalanche,
    HighestBalance,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::Avalanche => Strategy::Avalanche,
            CliStrategy::HighestBalance => Strategy::HighestBalance,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    Snowball,
    Avalanche,
    #[serde(alias = "highestBalance", alias = "highest_balance")]
    HighestBalance,
}

impl From<ApiStrategy> for CliStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Snowball => CliStrategy::Snowball,
            ApiStrategy::Avalanche => CliStrategy::Avalanche,
            ApiStrategy::HighestBalance => CliStrategy::HighestBalance,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtPayload {
    id: String,
    #[serde(default)]
    name: Option<String>,
    balance: f64,
    #[serde(default)]
    original_balance: Option<f64>,
    #[serde(alias = "interestRate")]
    annual_interest_rate: f64,
    minimum_payment: f64,
}

impl From<DebtPayload> for Debt {
    fn from(value: DebtPayload) -> Self {
        let debt = Debt::new(
            value.id,
            value.balance,
            value.annual_interest_rate,
            value.minimum_payment,
        )
        .with_name(value.name.unwrap_or_default());
        match value.original_balance {
            Some(original) => debt.with_original_balance(original),
            None => debt,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    debts: Option<Vec<DebtPayload>>,
    extra_monthly: Option<f64>,
    strategy: Option<ApiStrategy>,
    max_months: Option<u32>,
    rollover_freed_minimums: Option<bool>,
    start_year: Option<i32>,
    start_month: Option<u32>,
    target_months: Option<u32>,
    include_trace: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Debt payoff simulator (snowball / avalanche ordering with extra monthly payments)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the JSON HTTP API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Simulate a payoff plan and print the report as JSON.
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(
        long = "debt",
        value_parser = parse_debt_arg,
        help = "Debt as ID:BALANCE:RATE:MINIMUM[:ORIGINAL], rate in percent per year; repeatable"
    )]
    debts: Vec<Debt>,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Extra monthly payment on top of all minimums"
    )]
    extra: f64,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_MONTHS,
        help = "Safety cap on simulated months"
    )]
    max_months: u32,
    #[arg(long, help = "Add minimums of cleared debts to the extra payment pool")]
    rollover: bool,
    #[arg(
        long,
        help = "Also solve for the extra payment needed to be debt-free within this many months"
    )]
    target_months: Option<u32>,
    #[arg(long, help = "Calendar year of the first simulated month")]
    start_year: Option<i32>,
    #[arg(long, help = "Calendar month (1-12) of the first simulated month")]
    start_month: Option<u32>,
    #[arg(long, help = "Include the month-by-month trace")]
    trace: bool,
}

pub fn parse_debt_arg(raw: &str) -> Result<Debt, String> {
    let parts = raw.split(':').collect::<Vec<_>>();
    if parts.len() != 4 && parts.len() != 5 {
        return Err(format!(
            "expected ID:BALANCE:RATE:MINIMUM[:ORIGINAL], got '{raw}'"
        ));
    }
    let id = parts[0].trim();
    if id.is_empty() {
        return Err("debt id must not be empty".to_string());
    }
    let number = |field: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("debt '{id}': invalid {field} '{value}': {e}"))
    };
    let debt = Debt::new(
        id,
        number("balance", parts[1])?,
        number("rate", parts[2])?,
        number("minimum", parts[3])?,
    );
    match parts.get(4) {
        Some(&original) => Ok(debt.with_original_balance(number("original balance", original)?)),
        None => Ok(debt),
    }
}

#[derive(Debug)]
struct ApiRequest {
    debts: Vec<Debt>,
    extra_monthly: f64,
    strategy: Strategy,
    config: SimulationConfig,
    start: Option<CalendarMonth>,
    target_months: Option<u32>,
    include_trace: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StrategyReport {
    strategy: Strategy,
    outcome: PayoffOutcome,
    months: u32,
    total_interest: f64,
    remaining_balance: f64,
    order: Vec<String>,
    debt_payoffs: Vec<DebtPayoff>,
    baseline_outcome: PayoffOutcome,
    baseline_months: u32,
    baseline_total_interest: f64,
    months_saved: Option<i64>,
    interest_saved: Option<f64>,
    debt_free_month: Option<CalendarMonth>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalReport {
    target_months: u32,
    feasible: bool,
    converged: bool,
    solved_extra: Option<f64>,
    achieved_months: Option<u32>,
    achieved_total_interest: Option<f64>,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    strategy: Strategy,
    extra_monthly: f64,
    max_months: u32,
    rollover_freed_minimums: bool,
    summary: DebtSummary,
    active: StrategyReport,
    snowball: StrategyReport,
    avalanche: StrategyReport,
    avalanche_interest_advantage: f64,
    cheaper_strategy: Strategy,
    goal: Option<GoalReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<MonthTracePoint>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_request(args: SimulateArgs) -> Result<ApiRequest, String> {
    validate_debts(&args.debts).map_err(|e| e.to_string())?;
    validate_extra(args.extra).map_err(|e| format!("--extra: {e}"))?;

    let config = SimulationConfig {
        max_months: args.max_months,
        rollover_freed_minimums: args.rollover,
    };
    validate_config(&config).map_err(|e| format!("--max-months: {e}"))?;

    let start = match (args.start_year, args.start_month) {
        (None, None) => None,
        (Some(year), Some(month)) => Some(
            CalendarMonth::new(year, month)
                .ok_or_else(|| "--start-month must be between 1 and 12".to_string())?,
        ),
        _ => return Err("--start-year and --start-month must be given together".to_string()),
    };

    if let Some(target) = args.target_months {
        if target == 0 || target > config.max_months {
            return Err("--target-months must be between 1 and --max-months".to_string());
        }
    }

    Ok(ApiRequest {
        debts: args.debts,
        extra_monthly: args.extra,
        strategy: args.strategy.into(),
        config,
        start,
        target_months: args.target_months,
        include_trace: args.trace,
    })
}

fn build_simulate_response(request: &ApiRequest) -> Result<SimulateResponse, String> {
    let debts = &request.debts;
    let strategies = compare_strategies(debts, request.extra_monthly, &request.config)
        .map_err(|e| e.to_string())?;

    let policy = request.strategy.policy();
    let active = match strategies.for_strategy(request.strategy) {
        Some(comparison) => comparison.clone(),
        None => compare_with_baseline(debts, &policy, request.extra_monthly, &request.config)
            .map_err(|e| e.to_string())?,
    };

    let goal = match request.target_months {
        Some(target) => {
            let solved = solve_required_extra(
                debts,
                &policy,
                &request.config,
                GoalSolveConfig::for_target(target),
            )
            .map_err(|e| e.to_string())?;
            Some(goal_report(&solved))
        }
        None => None,
    };

    let trace = if request.include_trace {
        let (_, points) = simulate_with_trace(
            &policy.order(debts),
            request.extra_monthly,
            &request.config,
        )
        .map_err(|e| e.to_string())?;
        Some(points)
    } else {
        None
    };

    Ok(SimulateResponse {
        strategy: request.strategy,
        extra_monthly: request.extra_monthly,
        max_months: request.config.max_months,
        rollover_freed_minimums: request.config.rollover_freed_minimums,
        summary: DebtSummary::from_debts(debts),
        active: strategy_report(request.strategy, &active, request.start),
        snowball: strategy_report(Strategy::Snowball, &strategies.snowball, request.start),
        avalanche: strategy_report(Strategy::Avalanche, &strategies.avalanche, request.start),
        avalanche_interest_advantage: strategies.avalanche_interest_advantage.round(),
        cheaper_strategy: strategies.cheaper,
        goal,
        trace,
    })
}

fn strategy_report(
    strategy: Strategy,
    comparison: &Comparison,
    start: Option<CalendarMonth>,
) -> StrategyReport {
    let result = &comparison.accelerated;
    let meaningful = comparison.is_meaningful();
    StrategyReport {
        strategy,
        outcome: result.outcome,
        months: result.months,
        total_interest: result.rounded_total_interest(),
        remaining_balance: round_cents(result.remaining_balance),
        order: result.order.iter().map(|d| d.id.clone()).collect(),
        debt_payoffs: result.debt_payoffs.clone(),
        baseline_outcome: comparison.baseline.outcome,
        baseline_months: comparison.baseline.months,
        baseline_total_interest: comparison.baseline.rounded_total_interest(),
        months_saved: meaningful.then_some(comparison.months_saved),
        interest_saved: meaningful.then(|| comparison.interest_saved.round()),
        debt_free_month: start.and_then(|s| comparison.debt_free_month(s)),
    }
}

fn goal_report(solved: &GoalSolveResult) -> GoalReport {
    GoalReport {
        target_months: solved.target_months,
        feasible: solved.feasible,
        converged: solved.converged,
        solved_extra: solved.solved_extra.map(round_cents_up),
        achieved_months: solved.achieved.as_ref().map(|r| r.months),
        achieved_total_interest: solved
            .achieved
            .as_ref()
            .map(|r| r.rounded_total_interest()),
        message: solved.message.clone(),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_cents_up(value: f64) -> f64 {
    (value * 100.0).ceil() / 100.0
}

pub fn run_simulate_command(args: SimulateArgs) -> Result<String, String> {
    let request = build_request(args)?;
    let response = build_simulate_response(&request)?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("failed to encode report: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("payoff HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match build_simulate_response(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            tracing::warn!(error = %msg, "simulation failed");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.debts {
        args.debts = v.into_iter().map(Debt::from).collect();
    }
    if let Some(v) = payload.extra_monthly {
        args.extra = v;
    }
    if let Some(v) = payload.strategy {
        args.strategy = v.into();
    }
    if let Some(v) = payload.max_months {
        args.max_months = v;
    }
    if let Some(v) = payload.rollover_freed_minimums {
        args.rollover = v;
    }
    if let Some(v) = payload.start_year {
        args.start_year = Some(v);
    }
    if let Some(v) = payload.start_month {
        args.start_month = Some(v);
    }
    if let Some(v) = payload.target_months {
        args.target_months = Some(v);
    }
    if let Some(v) = payload.include_trace {
        args.trace = v;
    }

    build_request(args)
}

fn default_args_for_api() -> SimulateArgs {
    SimulateArgs {
        debts: Vec::new(),
        extra: 100.0,
        strategy: CliStrategy::Avalanche,
        max_months: DEFAULT_MAX_MONTHS,
        rollover: false,
        target_months: None,
        start_year: None,
        start_month: None,
        trace: false,
    }
}
