/// development facility with tranches, fees, prime-linked rate steps and
/// an early capital repayment
use amortization_rs::chrono::NaiveDate;
use amortization_rs::{
    generate_monthly_schedule, CustomCapitalEvent, DrawdownEvent, Fee, LoanConfig, Money, Rate,
    RatePeriod, RepaymentStructure, StructuredPayment,
};
use rust_decimal_macros::dec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("invalid date {}-{}-{}", y, m, d))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("amortization_rs=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prime = Rate::from_percentage(dec!(11.75));

    let config = LoanConfig::builder()
        .deal("Client XYZ", "Development Facility A")
        .facility_amount(Money::from_major(100_000_000))
        .residual(Money::from_major(10_000_000))
        .term_months(36)
        .repayment(RepaymentStructure::StructuredCapital)
        .drawdowns(vec![
            DrawdownEvent::new(date(2025, 3, 1)?, Money::from_major(60_000_000)),
            DrawdownEvent::new(date(2025, 9, 1)?, Money::from_major(40_000_000)),
        ])
        .first_payment_date(date(2025, 4, 1)?)
        .variable_rates(vec![
            RatePeriod::prime_linked(1, 12, prime, Rate::from_percentage(dec!(3))),
            RatePeriod::prime_linked(13, 36, prime, Rate::from_percentage(dec!(2))),
        ])
        .structured_payments(vec![
            StructuredPayment::new(1, 6, Money::ZERO),
            StructuredPayment::new(7, 36, Money::from_major(3_000_000)),
        ])
        .capitalised_fees(vec![
            Fee::nominal("Legal Fees", Money::from_major(200_000)),
            Fee::percent_of_facility("Raising Fee", dec!(2.3)),
        ])
        .custom_capital(vec![CustomCapitalEvent::new(date(2026, 6, 1)?, Money::from_major(5_000_000))])
        .build()?;

    let schedule = generate_monthly_schedule(&config)?;
    let summary = schedule.summary();

    println!("full capital:           {}", schedule.full_capital);
    println!("total drawn:            {}", summary.total_drawn);
    println!("total interest:         {}", summary.total_interest);
    println!("total principal repaid: {}", summary.total_principal_repaid);
    println!("total custom capital:   {}", summary.total_custom_capital);
    println!("final balance:          {}", summary.final_balance);

    for message in schedule.warning_messages() {
        println!("warning: {}", message);
    }

    Ok(())
}
