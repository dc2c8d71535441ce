use chrono::NaiveDate;

use crate::config::{DailyLoanConfig, DailyRate, DrawdownStructure, LoanConfig, RateStructure};
use crate::decimal::{Money, Rate};
use crate::schedule::{DailySchedule, MonthlySchedule};
use crate::types::{DealInfo, PaymentFrequency, RepaymentStructure};

use super::workbook::Sheet;

/// decimal places for rate percentages in sheets
const RATE_PCT_DP: u32 = 4;

fn money(amount: Money) -> String {
    amount.round_currency().to_string()
}

fn percent(rate: Rate) -> String {
    rate.as_percentage().round_dp(RATE_PCT_DP).normalize().to_string()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn yes_no(flag: bool) -> String {
    let label = if flag { "Yes" } else { "No" };
    label.to_string()
}

/// field/value pairs written as a two-column sheet
struct InputsSheet {
    sheet: Sheet,
}

impl InputsSheet {
    fn new() -> Self {
        Self {
            sheet: Sheet::new("Inputs", &["Field", "Value"]),
        }
    }

    fn field(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.sheet.push_row(vec![name.into(), value.into()]);
        self
    }

    fn finish(self) -> Sheet {
        self.sheet
    }
}

/// inputs summary for a monthly run
pub fn monthly_inputs(config: &LoanConfig, schedule: &MonthlySchedule) -> Sheet {
    let mut inputs = InputsSheet::new();

    inputs
        .field("Client Name", config.deal.client_name.as_str())
        .field("Facility Name", config.deal.facility_name.as_str())
        .field("Facility Amount", money(config.facility_amount))
        .field("Residual", money(config.residual))
        .field("Repayment Structure", config.repayment.to_string());

    match &config.rate {
        RateStructure::Fixed(rate) => {
            inputs
                .field("Rate Structure", "Fixed Rate")
                .field("Interest Rate %", percent(*rate));
        }
        RateStructure::Variable(_) => {
            inputs.field("Rate Structure", "Variable Rate");
        }
    }

    match &config.drawdown {
        DrawdownStructure::Single { date } => {
            inputs.field("Drawdown Structure", "Single Drawdown");
            if let Some(date) = date {
                inputs.field("Drawdown Date", iso(*date));
            }
        }
        DrawdownStructure::Multiple { .. } => {
            inputs.field("Drawdown Structure", "Multiple Drawdowns");
        }
    }

    inputs
        .field("Term (Months)", config.term_months.to_string())
        .field("Capitalise Fees", yes_no(config.capitalise_fees))
        .field("First Payment Date", iso(config.first_payment_date));

    if config.repayment == RepaymentStructure::CapitalisedInterest {
        if let Some(months) = config.capitalisation_months {
            inputs.field("Capitalisation Months", months.to_string());
        }
    }
    if let Some(payment) = config.payment_override {
        inputs.field("Payment Override", money(payment));
    }

    inputs.field("Custom Capital Repayments", yes_no(!config.custom_capital.is_empty()));

    if config.capitalise_fees {
        for fee in &config.fees {
            inputs.field(
                format!("{} ({})", fee.name, fee.kind()),
                money(fee.resolve(config.facility_amount)),
            );
        }
        inputs.field("Total Fees", money(config.total_fees()));
    }

    inputs
        .field("Full Capital Amount", money(schedule.full_capital))
        .field("Installment", money(schedule.installment));

    inputs.finish()
}

/// one row per ledger period
pub fn monthly_schedule(schedule: &MonthlySchedule) -> Sheet {
    let mut sheet = Sheet::new(
        "Schedule",
        &[
            "Period",
            "Payment Date",
            "Opening Balance",
            "Drawdown",
            "Balance Before Interest",
            "Interest Rate %",
            "Interest",
            "Regular Principal",
            "Custom Capital",
            "Total Principal",
            "Total Payment",
            "Ending Balance",
        ],
    );

    for row in &schedule.rows {
        sheet.push_row(vec![
            row.period.to_string(),
            iso(row.date),
            money(row.opening_balance),
            money(row.drawdown),
            money(row.balance_before_interest),
            percent(row.rate),
            money(row.interest),
            money(row.regular_principal),
            money(row.custom_capital),
            money(row.total_principal),
            money(row.total_payment),
            money(row.ending_balance),
        ]);
    }

    sheet
}

/// input lists that only apply to some monthly structures
pub fn monthly_optional(config: &LoanConfig) -> Vec<Sheet> {
    let mut sheets = Vec::new();

    if let DrawdownStructure::Multiple { tranches } = &config.drawdown {
        let mut sheet = Sheet::new("Drawdown Schedule", &["Date", "Amount"]);
        for tranche in tranches {
            sheet.push_row(vec![iso(tranche.date), money(tranche.amount)]);
        }
        sheets.push(sheet);
    }

    if let RateStructure::Variable(ranges) = &config.rate {
        let mut sheet = Sheet::new("Rate Schedule", &["From Period", "To Period", "Rate %"]);
        for range in ranges {
            sheet.push_row(vec![
                range.from_period.to_string(),
                range.to_period.to_string(),
                percent(range.rate),
            ]);
        }
        sheets.push(sheet);
    }

    if config.repayment == RepaymentStructure::StructuredCapital {
        let mut sheet = Sheet::new(
            "Payment Structure",
            &["From Period", "To Period", "Principal Amount"],
        );
        for payment in &config.structured_payments {
            sheet.push_row(vec![
                payment.from_period.to_string(),
                payment.to_period.to_string(),
                money(payment.principal_amount),
            ]);
        }
        sheets.push(sheet);
    }

    if !config.custom_capital.is_empty() {
        let mut sheet = Sheet::new("Custom Capital", &["Date", "Amount"]);
        for event in &config.custom_capital {
            sheet.push_row(vec![iso(event.date), money(event.amount)]);
        }
        sheets.push(sheet);
    }

    sheets
}

/// inputs summary for a daily run
pub fn daily_inputs(deal: &DealInfo, config: &DailyLoanConfig, schedule: &DailySchedule) -> Sheet {
    let mut inputs = InputsSheet::new();

    inputs
        .field("Client Name", deal.client_name.as_str())
        .field("Facility Name", deal.facility_name.as_str())
        .field("Loan Amount", money(config.loan_amount));

    match &config.rate {
        DailyRate::Fixed(rate) => {
            inputs
                .field("Rate Type", "Fixed")
                .field("Interest Rate %", percent(*rate));
        }
        DailyRate::Floating { margin, .. } => {
            inputs
                .field("Rate Type", "Prime Linked")
                .field("Margin %", percent(*margin));
        }
    }

    inputs
        .field("Initial Rate %", percent(config.initial_rate()))
        .field("Start Date", iso(config.start_date));

    if let Ok(maturity) = config.maturity_date() {
        inputs.field("Maturity Date", iso(maturity));
    }

    inputs
        .field("Term (Months)", config.term_months.to_string())
        .field("Repayment Type", config.repayment.to_string())
        .field("Payment Frequency", config.frequency.to_string());

    if config.frequency != PaymentFrequency::Custom {
        inputs
            .field("Payment Day", config.payment_day.to_string())
            .field("Payment Amount", money(schedule.payment_amount));
    }

    inputs.finish()
}

/// one row per calendar day
pub fn daily_schedule(schedule: &DailySchedule) -> Sheet {
    let mut sheet = Sheet::new(
        "Schedule",
        &[
            "Day",
            "Date",
            "Beginning Balance",
            "Prime Rate %",
            "Margin %",
            "Effective Rate %",
            "Daily Rate",
            "Daily Interest",
            "Capital Payment",
            "Ending Balance",
            "Capitalised Interest",
        ],
    );

    for row in &schedule.rows {
        sheet.push_row(vec![
            row.day.to_string(),
            iso(row.date),
            money(row.beginning_balance),
            row.prime.map(percent).unwrap_or_default(),
            row.margin.map(percent).unwrap_or_default(),
            percent(row.effective_rate),
            row.daily_rate.as_decimal().to_string(),
            money(row.daily_interest),
            row.capital_payment.map(money).unwrap_or_default(),
            money(row.ending_balance),
            row.capitalised_interest.map(money).unwrap_or_default(),
        ]);
    }

    sheet
}

/// prime changes and custom payments, when present
pub fn daily_optional(config: &DailyLoanConfig) -> Vec<Sheet> {
    let mut sheets = Vec::new();

    if let DailyRate::Floating { prime_changes, .. } = &config.rate {
        let mut sheet = Sheet::new("Prime Changes", &["Effective Date", "Prime Rate %"]);
        for change in prime_changes {
            let effective = change
                .effective_date
                .map(iso)
                .unwrap_or_else(|| "Initial".to_string());
            sheet.push_row(vec![effective, percent(change.prime)]);
        }
        sheets.push(sheet);
    }

    if config.frequency == PaymentFrequency::Custom && !config.custom_payments.is_empty() {
        let mut sheet = Sheet::new("Custom Payments", &["Date", "Amount"]);
        for payment in &config.custom_payments {
            sheet.push_row(vec![iso(payment.date), money(payment.amount)]);
        }
        sheets.push(sheet);
    }

    sheets
}
