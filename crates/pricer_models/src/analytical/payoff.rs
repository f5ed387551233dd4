//! Striked payoff definitions.
//!
//! A [`Payoff`] pairs an option direction and a strike with a
//! [`PayoffKind`] carrying kind-specific data. The Black calculator
//! specializes its coefficients on the kind once at construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Option direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to receive the underlying above the strike.
    Call,
    /// Right to receive the underlying below the strike.
    Put,
}

impl OptionType {
    /// +1 for calls, -1 for puts.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Shape of a striked payoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PayoffKind {
    /// max(S - K, 0) or max(K - S, 0).
    PlainVanilla,
    /// Fixed cash amount if in the money.
    CashOrNothing {
        /// Amount paid when the option finishes in the money
        cash_payoff: f64,
    },
    /// The underlying itself if in the money.
    AssetOrNothing,
    /// Triggered at the strike, pays against a second strike.
    Gap {
        /// Strike used in the paid amount
        second_strike: f64,
    },
    /// S / K when K <= S < second strike.
    SuperFund {
        /// Upper bound of the paying range
        second_strike: f64,
    },
}

impl PayoffKind {
    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            PayoffKind::PlainVanilla => "PlainVanilla",
            PayoffKind::CashOrNothing { .. } => "CashOrNothing",
            PayoffKind::AssetOrNothing => "AssetOrNothing",
            PayoffKind::Gap { .. } => "Gap",
            PayoffKind::SuperFund { .. } => "SuperFund",
        }
    }
}

/// Immutable striked payoff.
///
/// # Examples
/// ```
/// use pricer_models::analytical::{OptionType, Payoff};
///
/// let call = Payoff::plain_vanilla(OptionType::Call, 100.0);
/// assert_eq!(call.evaluate(110.0), 10.0);
///
/// let digital = Payoff::cash_or_nothing(OptionType::Put, 100.0, 5.0);
/// assert_eq!(digital.evaluate(90.0), 5.0);
/// assert_eq!(digital.evaluate(110.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payoff {
    option_type: OptionType,
    strike: f64,
    kind: PayoffKind,
}

impl Payoff {
    /// Creates a payoff of any kind.
    pub fn new(option_type: OptionType, strike: f64, kind: PayoffKind) -> Self {
        Self {
            option_type,
            strike,
            kind,
        }
    }

    /// Plain vanilla call or put.
    pub fn plain_vanilla(option_type: OptionType, strike: f64) -> Self {
        Self::new(option_type, strike, PayoffKind::PlainVanilla)
    }

    /// Binary paying `cash_payoff` in the money.
    pub fn cash_or_nothing(option_type: OptionType, strike: f64, cash_payoff: f64) -> Self {
        Self::new(option_type, strike, PayoffKind::CashOrNothing { cash_payoff })
    }

    /// Binary paying the underlying in the money.
    pub fn asset_or_nothing(option_type: OptionType, strike: f64) -> Self {
        Self::new(option_type, strike, PayoffKind::AssetOrNothing)
    }

    /// Gap payoff triggered at `strike`, paying against `second_strike`.
    pub fn gap(option_type: OptionType, strike: f64, second_strike: f64) -> Self {
        Self::new(option_type, strike, PayoffKind::Gap { second_strike })
    }

    /// Option direction.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Strike (trigger level for binary and gap kinds).
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Payoff shape.
    #[inline]
    pub fn kind(&self) -> PayoffKind {
        self.kind
    }

    /// Same payoff with every strike-like level moved by `shift`.
    ///
    /// Cash amounts are not levels of the underlying and stay unchanged.
    pub fn shifted(&self, shift: f64) -> Self {
        let kind = match self.kind {
            PayoffKind::Gap { second_strike } => PayoffKind::Gap {
                second_strike: second_strike + shift,
            },
            PayoffKind::SuperFund { second_strike } => PayoffKind::SuperFund {
                second_strike: second_strike + shift,
            },
            other => other,
        };
        Self::new(self.option_type, self.strike + shift, kind)
    }

    /// Payoff at expiry for an underlying value.
    pub fn evaluate(&self, underlying: f64) -> f64 {
        let k = self.strike;
        let x = underlying;
        match (self.kind, self.option_type) {
            (PayoffKind::PlainVanilla, OptionType::Call) => (x - k).max(0.0),
            (PayoffKind::PlainVanilla, OptionType::Put) => (k - x).max(0.0),
            (PayoffKind::CashOrNothing { cash_payoff }, OptionType::Call) => {
                if x - k > 0.0 {
                    cash_payoff
                } else {
                    0.0
                }
            }
            (PayoffKind::CashOrNothing { cash_payoff }, OptionType::Put) => {
                if k - x > 0.0 {
                    cash_payoff
                } else {
                    0.0
                }
            }
            (PayoffKind::AssetOrNothing, OptionType::Call) => {
                if x - k > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            (PayoffKind::AssetOrNothing, OptionType::Put) => {
                if k - x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            (PayoffKind::Gap { second_strike }, OptionType::Call) => {
                if x - k >= 0.0 {
                    x - second_strike
                } else {
                    0.0
                }
            }
            (PayoffKind::Gap { second_strike }, OptionType::Put) => {
                if k - x >= 0.0 {
                    second_strike - x
                } else {
                    0.0
                }
            }
            (PayoffKind::SuperFund { second_strike }, _) => {
                if k > 0.0 && x >= k && x < second_strike {
                    x / k
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for Payoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} K={}", self.kind.name(), self.option_type, self.strike)
    }
}
