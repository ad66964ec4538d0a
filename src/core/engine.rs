use super::types::{
    AnnualInterestRow, BalancePoint, LoanBreakdown, LoanInputs, PaymentRow, ScheduleOutcome,
};
use super::{BALANCE_SNAP, INTEREST_DEDUCTION_RATE, NEGLIGIBLE_AMOUNT};

/// Computes the full repayment breakdown for one set of loan inputs.
///
/// Pure and deterministic: the same inputs always produce the same result,
/// and every degenerate input resolves to a well-defined outcome instead of
/// an error. Callers decide how to present non-`Repayment` outcomes.
pub fn compute_loan_breakdown(inputs: &LoanInputs) -> LoanBreakdown {
    let loan_amount = inputs.loan_amount();

    if loan_amount <= 0.0 {
        return LoanBreakdown::without_schedule(ScheduleOutcome::NoLoan, loan_amount);
    }

    if inputs.term_years == 0 {
        return immediate_payoff(loan_amount);
    }

    let monthly_rate = inputs.annual_rate_percent / 100.0 / 12.0;
    let installments = inputs.term_years * 12;

    let Some(monthly_payment) = estimate_monthly_payment(loan_amount, monthly_rate, installments)
    else {
        return LoanBreakdown::without_schedule(ScheduleOutcome::UnstablePayment, loan_amount);
    };

    let total_payments = monthly_payment * installments as f64;
    let total_interest = (total_payments - loan_amount).max(0.0);

    let schedule = build_schedule(loan_amount, monthly_rate, installments, monthly_payment);
    let annual_summary = summarize_annual_interest(&schedule);
    let scheduled_interest = annual_summary.iter().map(|row| row.interest_paid).sum();
    let scheduled_deduction = annual_summary.iter().map(|row| row.deduction).sum();
    let balance_curve = build_balance_curve(loan_amount, &schedule);

    LoanBreakdown {
        outcome: ScheduleOutcome::Repayment,
        loan_amount,
        monthly_payment,
        total_payments,
        total_interest,
        schedule,
        annual_summary,
        scheduled_interest,
        scheduled_deduction,
        balance_curve,
    }
}

fn immediate_payoff(loan_amount: f64) -> LoanBreakdown {
    let schedule = vec![PaymentRow {
        month: 1,
        payment: loan_amount,
        principal_portion: loan_amount,
        interest_portion: 0.0,
        remaining_balance: 0.0,
        year: 1,
    }];
    let balance_curve = build_balance_curve(loan_amount, &schedule);

    LoanBreakdown {
        outcome: ScheduleOutcome::ImmediatePayoff,
        loan_amount,
        monthly_payment: loan_amount,
        total_payments: loan_amount,
        total_interest: 0.0,
        schedule,
        annual_summary: Vec::new(),
        scheduled_interest: 0.0,
        scheduled_deduction: 0.0,
        balance_curve,
    }
}

/// Fixed monthly installment for an amortizing loan, or `None` when the
/// formula yields a negative or non-finite payment.
fn estimate_monthly_payment(
    loan_amount: f64,
    monthly_rate: f64,
    installments: u32,
) -> Option<f64> {
    if installments == 0 {
        return Some(loan_amount);
    }
    if monthly_rate == 0.0 {
        return Some(loan_amount / installments as f64);
    }

    let growth = (1.0 + monthly_rate).powi(installments as i32);
    let denominator = growth - 1.0;
    if denominator == 0.0 {
        // Rate so small the compounding underflows; effectively interest-free.
        return Some(loan_amount / installments as f64);
    }

    let payment = loan_amount * monthly_rate * growth / denominator;
    if payment < 0.0 || !payment.is_finite() {
        return None;
    }
    Some(payment)
}

fn build_schedule(
    loan_amount: f64,
    monthly_rate: f64,
    installments: u32,
    monthly_payment: f64,
) -> Vec<PaymentRow> {
    if installments == 0 || monthly_payment <= NEGLIGIBLE_AMOUNT {
        return Vec::new();
    }

    let mut schedule = Vec::with_capacity(installments as usize);
    let mut remaining_balance = loan_amount;

    for month in 1..=installments {
        let interest_portion = (remaining_balance * monthly_rate).max(0.0);

        let (principal_portion, payment) = if month == installments {
            // Final installment clears whatever is left.
            (remaining_balance, remaining_balance + interest_portion)
        } else {
            let mut principal = monthly_payment - interest_portion;
            if principal < 0.0 {
                principal = 0.0;
            }
            if principal > remaining_balance + BALANCE_SNAP {
                principal = remaining_balance;
            }
            (principal, monthly_payment)
        };

        remaining_balance -= principal_portion;
        if remaining_balance.abs() < BALANCE_SNAP {
            remaining_balance = 0.0;
        }

        schedule.push(PaymentRow {
            month,
            payment,
            principal_portion,
            interest_portion,
            remaining_balance,
            year: month.div_ceil(12),
        });
    }

    schedule
}

/// Groups ledger interest by year, dropping years whose total is negligible
/// (a loan can close early in a year with almost no interest paid in it).
fn summarize_annual_interest(schedule: &[PaymentRow]) -> Vec<AnnualInterestRow> {
    let mut rows: Vec<AnnualInterestRow> = Vec::new();
    for payment in schedule {
        match rows.last_mut() {
            Some(last) if last.year == payment.year => {
                last.interest_paid += payment.interest_portion;
            }
            _ => rows.push(AnnualInterestRow {
                year: payment.year,
                interest_paid: payment.interest_portion,
                deduction: 0.0,
            }),
        }
    }

    rows.retain(|row| row.interest_paid > NEGLIGIBLE_AMOUNT);
    for row in &mut rows {
        row.deduction = row.interest_paid * INTEREST_DEDUCTION_RATE;
    }
    rows
}

/// Year-by-year series for the balance chart: the lowest balance observed in
/// each year, with a synthetic year-0 point at the full loan amount.
fn build_balance_curve(loan_amount: f64, schedule: &[PaymentRow]) -> Vec<BalancePoint> {
    if schedule.is_empty() || loan_amount <= 0.0 {
        return Vec::new();
    }

    let mut curve = vec![BalancePoint {
        year: 0,
        balance: loan_amount,
    }];
    for payment in schedule {
        match curve.last_mut() {
            Some(point) if point.year == payment.year => {
                point.balance = point.balance.min(payment.remaining_balance);
            }
            _ => curve.push(BalancePoint {
                year: payment.year,
                balance: payment.remaining_balance,
            }),
        }
    }
    curve
}
