pub mod accrual;
pub mod prime;
pub mod resolver;

pub use accrual::InterestAccumulator;
pub use prime::{normalize_prime_changes, prime_on};
pub use resolver::{normalize_ranges, resolve_range, resolve_rate, resolve_structured_principal};
