/// write a schedule workbook as csv sheets and json
use amortization_rs::chrono::NaiveDate;
use amortization_rs::{
    generate_monthly_schedule, LoanConfig, Money, Rate, RepaymentStructure, SafeTimeProvider,
    TimeSource, Workbook,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoanConfig::builder()
        .deal("Client XYZ", "Bridge Facility")
        .facility_amount(Money::from_major(20_000_000))
        .term_months(24)
        .repayment(RepaymentStructure::CapitalisedInterest)
        .capitalisation_months(6)
        .single_drawdown(NaiveDate::from_ymd_opt(2025, 3, 1).ok_or("bad date")?)
        .first_payment_date(NaiveDate::from_ymd_opt(2025, 4, 1).ok_or("bad date")?)
        .prime_linked_rate(Rate::from_percentage(dec!(11.75)), Rate::from_percentage(dec!(2)))
        .build()?;

    let schedule = generate_monthly_schedule(&config)?;

    let time = SafeTimeProvider::new(TimeSource::System);
    let workbook = Workbook::monthly(&config, &schedule, &time);

    let out = std::env::temp_dir();
    let dir = workbook.write_csv_dir(&out)?;
    let json = workbook.write_json(&out)?;

    println!("sheets: {:?}", workbook.sheet_names());
    println!("csv:    {}", dir.display());
    println!("json:   {}", json.display());

    Ok(())
}
