pub mod pmt;

pub use pmt::{calculate_payment, installment};
