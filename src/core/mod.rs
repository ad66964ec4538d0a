//! Amortization schedule engine for SU loan repayment

mod engine;
mod types;

pub use engine::compute_loan_breakdown;
pub use types::{
    AnnualInterestRow, BalancePoint, LoanBreakdown, LoanInputs, PaymentRow, ScheduleOutcome,
};

// ============================================================================
// Monetary tolerances and fixed rates
// ============================================================================
// All monetary arithmetic is f64. The two epsilons below are load-bearing:
// the ledger terminates with an exactly-zero balance only because balances
// and principal allocations are snapped against them.

/// Payments and yearly interest sums at or below this are treated as zero.
pub const NEGLIGIBLE_AMOUNT: f64 = 0.005;

/// Remaining balances within this of zero snap to exactly zero; principal
/// allocations overshooting the balance by more than this are capped.
pub const BALANCE_SNAP: f64 = 0.01;

/// Fraction of paid interest that is tax deductible (33.1%).
pub const INTEREST_DEDUCTION_RATE: f64 = 0.331;

/// Longest supported repayment term in years.
pub const MAX_TERM_YEARS: u32 = 15;
