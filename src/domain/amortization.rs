//! Fixed-rate loan amortization.
//!
//! Turns a set of [`LoanTerms`] into a level monthly payment and the full
//! installment schedule. Everything here is pure: no I/O, no clock, no shared
//! state, so the same terms always produce the same result.

use super::loan::{AmortizationResult, Installment, LoanTerms};
use super::money::{Money, RoundingPolicy};
use crate::error::{LoanError, Result};
use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Computes the schedule rounded to cents.
pub fn compute_amortization(terms: &LoanTerms) -> Result<AmortizationResult> {
    compute_amortization_with(terms, RoundingPolicy::default())
}

/// Computes the schedule under an explicit rounding policy.
///
/// Interest accrues on the unrounded balance at full decimal precision and
/// nothing is rounded until an installment is reported. The reported balance
/// is rounded half-to-even to the policy's minor unit, the principal portion
/// is the drop in reported balance and the payment is that principal plus the
/// rounded interest. Rows therefore reconcile exactly, the principal portions
/// add up to the principal and the last balance is zero, while no rounding
/// error is carried from one month into the next.
///
/// The price of not carrying rounding error forward is that an individual
/// installment may differ from `monthly_payment` by up to two minor units
/// (the 10000 at 12% over 12 months loan pays 888.48 in months 5 and 8
/// against a level 888.49). `total_payments` is the sum of what is actually
/// due, so it can sit a few minor units below `monthly_payment * term`.
///
/// Amounts too large for 28 significant digits are rejected as
/// `InvalidLoanTerms` on `term_months` rather than overflowing.
pub fn compute_amortization_with(
    terms: &LoanTerms,
    policy: RoundingPolicy,
) -> Result<AmortizationResult> {
    terms.validate()?;
    if !policy.is_representable(terms.principal().value()) {
        return Err(LoanError::invalid(
            "principal",
            format!("has more than {} decimal places", policy.scale()),
        ));
    }

    let principal = policy.round(terms.principal().value());
    let term = terms.term_in_months();
    let monthly_rate = terms.annual_interest_rate_percent() / dec!(100) / dec!(12);
    let exact_payment = level_payment(principal.value(), monthly_rate, term)?;

    let mut schedule = Vec::with_capacity(term as usize);
    let mut balance = principal.value();
    let mut reported_balance = principal;
    for sequence_number in 1..=term {
        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or_else(|| overflow(term))?;
        balance = if sequence_number == term {
            Decimal::ZERO
        } else {
            exact_payment
                .checked_sub(interest)
                .and_then(|principal_paid| balance.checked_sub(principal_paid))
                .ok_or_else(|| overflow(term))?
                .max(Decimal::ZERO)
        };

        let remaining_balance = policy.round(balance);
        let principal_portion = reported_balance - remaining_balance;
        let interest_portion = policy.round(interest);
        reported_balance = remaining_balance;

        schedule.push(Installment {
            sequence_number,
            due_date: due_date(terms.start_date(), sequence_number)?,
            payment_amount: principal_portion
                .checked_add(interest_portion)
                .ok_or_else(|| overflow(term))?,
            principal_portion,
            interest_portion,
            remaining_balance,
        });
    }

    let total_payments = schedule
        .iter()
        .try_fold(Money::ZERO, |acc, i| acc.checked_add(i.payment_amount))
        .ok_or_else(|| overflow(term))?;
    Ok(AmortizationResult {
        monthly_payment: policy.round(exact_payment),
        total_payments,
        total_interest: total_payments - principal,
        schedule,
    })
}

/// Unrounded level payment for `term` periods at `rate` per period.
fn level_payment(principal: Decimal, rate: Decimal, term: u32) -> Result<Decimal> {
    let term_dec = Decimal::from(term);
    if rate.is_zero() {
        return Ok(principal / term_dec);
    }

    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(term))
        .ok_or_else(|| overflow(term))?;
    let numerator = principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_mul(growth))
        .ok_or_else(|| overflow(term))?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        // Rate too small to move (1 + r)^n at 28 digits; behaves as interest-free.
        return Ok(principal / term_dec);
    }
    numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow(term))
}

fn overflow(term: u32) -> LoanError {
    LoanError::invalid(
        "term_months",
        format!("{term} months at this rate exceeds decimal precision"),
    )
}

/// `start` advanced by `months` calendar months.
///
/// Day-of-month overflow clamps to the last day of the target month, so
/// 31 January plus one month is the last day of February.
pub fn due_date(start: NaiveDate, months: u32) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| LoanError::invalid("start_date", "schedule runs past the calendar range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms(principal: Decimal, rate: Decimal, term: u32) -> LoanTerms {
        LoanTerms::new(principal, rate, term, date(2024, 1, 1)).unwrap()
    }

    #[test]
    fn test_reference_loan() {
        let result = compute_amortization(&terms(dec!(10000), dec!(12), 12)).unwrap();

        assert_eq!(result.monthly_payment, Money::new(dec!(888.49)));
        assert_eq!(result.schedule.len(), 12);

        let first = &result.schedule[0];
        assert_eq!(first.sequence_number, 1);
        assert_eq!(first.due_date, date(2024, 2, 1));
        assert_eq!(first.interest_portion, Money::new(dec!(100.00)));
        assert_eq!(first.principal_portion, Money::new(dec!(788.49)));
        assert_eq!(first.remaining_balance, Money::new(dec!(9211.51)));

        let last = result.schedule.last().unwrap();
        assert_eq!(last.sequence_number, 12);
        assert_eq!(last.due_date, date(2025, 1, 1));
        assert_eq!(last.remaining_balance, Money::ZERO);

        assert_eq!(last.principal_portion, Money::new(dec!(879.69)));
        assert_eq!(last.interest_portion, Money::new(dec!(8.80)));

        // 888.49 * 12 = 10661.88; rounding interest month by month lands two
        // cents lower.
        assert_eq!(result.total_payments, Money::new(dec!(10661.86)));
        assert_eq!(result.total_interest, Money::new(dec!(661.86)));
    }

    #[test]
    fn test_interest_free_loan() {
        let result = compute_amortization(&terms(dec!(1200), dec!(0), 12)).unwrap();
        assert_eq!(result.monthly_payment, Money::new(dec!(100)));
        for installment in &result.schedule {
            assert!(installment.interest_portion.is_zero());
            assert_eq!(installment.principal_portion, result.monthly_payment);
            assert_eq!(installment.payment_amount, result.monthly_payment);
        }
        assert_eq!(result.total_interest, Money::ZERO);
    }

    #[test]
    fn test_interest_free_uneven_split() {
        let result = compute_amortization(&terms(dec!(1000), dec!(0), 3)).unwrap();
        assert_eq!(result.monthly_payment, Money::new(dec!(333.33)));
        let payments: Vec<Money> = result.schedule.iter().map(|i| i.payment_amount).collect();
        assert_eq!(
            payments,
            vec![
                Money::new(dec!(333.33)),
                Money::new(dec!(333.34)),
                Money::new(dec!(333.33))
            ]
        );
        assert_eq!(result.total_payments, Money::new(dec!(1000)));
    }

    #[test]
    fn test_single_month_term() {
        let result = compute_amortization(&terms(dec!(500), dec!(24), 1)).unwrap();
        assert_eq!(result.schedule.len(), 1);
        let only = &result.schedule[0];
        assert_eq!(only.interest_portion, Money::new(dec!(10.00)));
        assert_eq!(only.principal_portion, Money::new(dec!(500)));
        assert_eq!(only.payment_amount, Money::new(dec!(510.00)));
        assert_eq!(result.monthly_payment, Money::new(dec!(510.00)));
    }

    #[test]
    fn test_month_end_start_date() {
        let jan_31 = LoanTerms::new(dec!(3000), dec!(10), 3, date(2024, 1, 31)).unwrap();
        let result = compute_amortization(&jan_31).unwrap();
        let due: Vec<NaiveDate> = result.schedule.iter().map(|i| i.due_date).collect();
        assert_eq!(due, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_due_date_rolls_over_year() {
        assert_eq!(due_date(date(2023, 11, 15), 3).unwrap(), date(2024, 2, 15));
        assert_eq!(due_date(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(due_date(date(2024, 1, 1), 120).unwrap(), date(2034, 1, 1));
    }

    #[test]
    fn test_thirty_year_mortgage_closes() {
        let result = compute_amortization(&terms(dec!(250000), dec!(6.5), 360)).unwrap();
        assert_eq!(result.monthly_payment, Money::new(dec!(1580.17)));
        assert_eq!(result.schedule.len(), 360);
        assert_eq!(result.schedule[359].remaining_balance, Money::ZERO);
        let principal_paid: Money = result.schedule.iter().map(|i| i.principal_portion).sum();
        assert_eq!(principal_paid, Money::new(dec!(250000)));
    }

    #[test]
    fn test_zero_scale_currency() {
        let policy = RoundingPolicy::new(0).unwrap();
        let result = compute_amortization_with(&terms(dec!(600000), dec!(30), 6), policy).unwrap();
        for installment in &result.schedule {
            assert_eq!(installment.payment_amount.value().scale(), 0);
            assert_eq!(installment.interest_portion.value().scale(), 0);
        }
        assert_eq!(result.schedule[5].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_sub_minor_unit_principal_rejected() {
        let result = compute_amortization(&terms(dec!(100.005), dec!(5), 6));
        assert!(matches!(
            result,
            Err(LoanError::InvalidLoanTerms { field: "principal", .. })
        ));
    }

    #[test]
    fn test_stored_terms_revalidated() {
        let json = r#"{"principal":"0","annual_interest_rate_percent":"5","term_in_months":12,"start_date":"2024-01-01"}"#;
        let forged: LoanTerms = serde_json::from_str(json).unwrap();
        assert!(matches!(
            compute_amortization(&forged),
            Err(LoanError::InvalidLoanTerms { field: "principal", .. })
        ));
    }

    #[test]
    fn test_precision_overflow_rejected() {
        let extreme = terms(dec!(1000), dec!(1200), 1000);
        assert!(matches!(
            compute_amortization(&extreme),
            Err(LoanError::InvalidLoanTerms { field: "term_months", .. })
        ));
    }

    #[test]
    fn test_oversized_amounts_rejected() {
        let huge = terms(dec!(100000000000000000000), dec!(1000000000000), 1);
        assert!(matches!(
            compute_amortization(&huge),
            Err(LoanError::InvalidLoanTerms { field: "term_months", .. })
        ));
    }

    #[test]
    fn test_extreme_terms_never_panic() {
        let principals = [dec!(1), dec!(99999999999999999999), dec!(79228162514264337593543950)];
        let rates = [dec!(0), dec!(0.0000001), dec!(1000), dec!(1000000000000)];
        for principal in principals {
            for rate in rates {
                for term in [1, 12, 600] {
                    match compute_amortization(&terms(principal, rate, term)) {
                        Ok(result) => assert_eq!(result.schedule.len(), term as usize),
                        Err(e) => assert!(matches!(e, LoanError::InvalidLoanTerms { .. })),
                    }
                }
            }
        }
    }

    #[test]
    fn test_reference_loan_payments_stay_near_level() {
        let result = compute_amortization(&terms(dec!(10000), dec!(12), 12)).unwrap();
        assert_eq!(result.schedule[4].payment_amount, Money::new(dec!(888.48)));
        assert_eq!(result.schedule[7].payment_amount, Money::new(dec!(888.48)));
        for installment in &result.schedule {
            let deviation = (installment.payment_amount.value() - result.monthly_payment.value()).abs();
            assert!(deviation <= dec!(0.02));
        }
    }

    #[test]
    fn test_deterministic() {
        let t = terms(dec!(7500), dec!(19.5), 18);
        assert_eq!(compute_amortization(&t).unwrap(), compute_amortization(&t).unwrap());
    }
}
