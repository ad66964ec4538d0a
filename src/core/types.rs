use serde::Serialize;

/// How a computation resolved. Every input maps to exactly one of these;
/// none of them is an error at the core level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScheduleOutcome {
    /// Standard amortizing repayment over the full term.
    Repayment,
    /// Effective loan amount is zero or negative; nothing to repay.
    NoLoan,
    /// Loan exists but the term is zero years; single payoff in month 1.
    ImmediatePayoff,
    /// The amortization formula produced a negative or non-finite payment;
    /// the payment falls back to 0 and no schedule is generated.
    UnstablePayment,
}

#[derive(Debug, Clone)]
pub struct LoanInputs {
    /// Loan amount before the extraordinary deposit, in kr.
    pub principal: f64,
    /// Extraordinary deposit subtracted from the principal up front.
    pub extra_deposit: f64,
    /// Annual interest rate as a percentage, e.g. 3.75.
    pub annual_rate_percent: f64,
    /// Repayment term in whole years, 0..=15.
    pub term_years: u32,
}

impl LoanInputs {
    /// Effective amount to amortize; may be zero or negative when the
    /// deposit covers the principal.
    pub fn loan_amount(&self) -> f64 {
        self.principal - self.extra_deposit
    }
}

/// One month of the repayment ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    pub month: u32,
    pub payment: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,
    pub remaining_balance: f64,
    pub year: u32,
}

/// Interest paid within one calendar year of the schedule and the
/// deduction it earns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualInterestRow {
    pub year: u32,
    pub interest_paid: f64,
    pub deduction: f64,
}

/// Chart point: lowest remaining balance observed in a year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub year: u32,
    pub balance: f64,
}

/// Complete result of one computation. Always consistent: degenerate
/// inputs produce empty sequences and zero totals, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanBreakdown {
    pub outcome: ScheduleOutcome,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    /// Estimate over the full term, `monthly_payment * N`.
    pub total_payments: f64,
    /// Estimate `total_payments - loan_amount`, clamped at zero.
    pub total_interest: f64,
    pub schedule: Vec<PaymentRow>,
    pub annual_summary: Vec<AnnualInterestRow>,
    /// Lifetime interest summed over the retained annual-summary years.
    pub scheduled_interest: f64,
    /// Lifetime deduction summed over the retained annual-summary years.
    pub scheduled_deduction: f64,
    pub balance_curve: Vec<BalancePoint>,
}

impl LoanBreakdown {
    pub(crate) fn without_schedule(outcome: ScheduleOutcome, loan_amount: f64) -> Self {
        Self {
            outcome,
            loan_amount,
            monthly_payment: 0.0,
            total_payments: 0.0,
            total_interest: 0.0,
            schedule: Vec::new(),
            annual_summary: Vec::new(),
            scheduled_interest: 0.0,
            scheduled_deduction: 0.0,
            balance_curve: Vec::new(),
        }
    }
}
