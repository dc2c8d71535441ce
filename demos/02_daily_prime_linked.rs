/// daily accrual on a prime-linked loan with monthly capitalisation
use amortization_rs::chrono::NaiveDate;
use amortization_rs::{
    generate_daily_schedule, DailyLoanConfig, DailyRepaymentType, Money, PaymentFrequency,
    PrimeChange, Rate,
};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let prime_cut = NaiveDate::from_ymd_opt(2025, 7, 31).ok_or("bad date")?;

    let config = DailyLoanConfig::builder()
        .loan_amount(Money::from_major(5_000_000))
        .floating_rate(
            Rate::from_percentage(dec!(11)),
            Rate::from_percentage(dec!(2.5)),
            vec![PrimeChange::on(prime_cut, Rate::from_percentage(dec!(10.75)))],
        )
        .start_date(NaiveDate::from_ymd_opt(2025, 3, 1).ok_or("bad date")?)
        .term_months(12)
        .repayment(DailyRepaymentType::Amortising { payment_override: None })
        .frequency(PaymentFrequency::Quarterly)
        .payment_day(1)
        .build()?;

    let schedule = generate_daily_schedule(&config)?;

    println!("quarterly payment: {}", schedule.payment_amount);
    for row in schedule.rows.iter().filter(|r| r.capitalised_interest.is_some()) {
        println!(
            "{} rate {} capitalised {:>10} balance {:>12}",
            row.date,
            row.effective_rate,
            row.capitalised_interest.unwrap_or(Money::ZERO),
            row.ending_balance
        );
    }

    let summary = schedule.summary();
    println!("total interest: {}", summary.total_interest);
    println!("final balance:  {}", summary.final_balance);

    Ok(())
}
