//! Coupon pricers.
//!
//! - [`BlackIborCouponPricer`]: Black/Bachelier optionlets on Ibor fixings
//!   with an optional timing adjustment for in-arrears or delayed payment
//! - [`TimingAdjustment`]: choice of adjustment model

mod black_ibor;
mod timing;

pub use black_ibor::{BlackIborCouponPricer, IborCouponValuation};
pub use timing::TimingAdjustment;
