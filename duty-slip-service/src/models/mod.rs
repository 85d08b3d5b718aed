pub mod customer_rate;
pub mod duty_slip;
pub mod lenient;
pub mod rate_title;

pub use customer_rate::{CustomerRate, NewCustomerRate, RatePatch};
pub use duty_slip::{
    Balance, DutySlip, DutySlipDraft, PaymentMethod, Settlement, SettlementWarning, VehicleType,
};
pub use rate_title::RateTitle;
