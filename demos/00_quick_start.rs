/// quick start - minimal example to get started
use amortization_rs::chrono::NaiveDate;
use amortization_rs::{generate_monthly_schedule, LoanConfig, Money, Rate};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // R1m over 12 months at 12%, equal installments
    let config = LoanConfig::builder()
        .facility_amount(Money::from_major(1_000_000))
        .term_months(12)
        .first_payment_date(NaiveDate::from_ymd_opt(2025, 4, 1).ok_or("bad date")?)
        .fixed_rate(Rate::from_percentage(dec!(12)))
        .build()?;

    let schedule = generate_monthly_schedule(&config)?;

    println!("installment: {}", schedule.installment);
    for row in &schedule.rows {
        println!(
            "{:>3} {} interest {:>10} principal {:>10} balance {:>12}",
            row.period, row.date, row.interest, row.regular_principal, row.ending_balance
        );
    }

    Ok(())
}
