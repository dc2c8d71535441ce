pub mod config;
pub mod decimal;
pub mod errors;
pub mod export;
pub mod interest;
pub mod payments;
pub mod schedule;
pub mod types;
pub mod warnings;

// re-export key types
pub use config::{
    DailyLoanConfig, DailyLoanConfigBuilder, DailyRate, DrawdownStructure, LoanConfig,
    LoanConfigBuilder, RateStructure,
};
pub use decimal::{Money, Rate};
pub use errors::{Result, ScheduleError};
pub use export::{ExportError, Sheet, Workbook};
pub use payments::{calculate_payment, installment};
pub use schedule::{
    generate_daily_schedule, generate_monthly_schedule, DailyLedgerRow, DailySchedule,
    DailySummary, LedgerRow, MonthlySchedule, ScheduleSummary,
};
pub use types::{
    CustomCapitalEvent, CustomPayment, DailyRepaymentType, DealInfo, DrawdownEvent, Fee,
    FeeAmount, PaymentFrequency, PrimeChange, RatePeriod, RepaymentStructure, StructuredPayment,
    YearMonth,
};
pub use warnings::{ScheduleWarning, WarningLog};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
