//! Observable scalar market quotes.

use std::sync::RwLock;

use crate::market_data::error::MarketDataError;
use crate::observable::{Observable, Observe};

/// Observable scalar market value, such as a correlation.
pub trait Quote: Observe + Send + Sync {
    /// Current value.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::MissingQuote` - If the quote holds no value
    fn value(&self) -> Result<f64, MarketDataError>;

    /// Whether [`value`](Self::value) would succeed.
    fn is_valid(&self) -> bool {
        self.value().is_ok()
    }
}

/// Quote holding a settable value.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::{Quote, SimpleQuote};
///
/// let rho = SimpleQuote::new(0.8);
/// assert_eq!(rho.value().unwrap(), 0.8);
///
/// rho.set_value(Some(0.5));
/// assert_eq!(rho.value().unwrap(), 0.5);
///
/// rho.set_value(None);
/// assert!(!rho.is_valid());
/// ```
#[derive(Debug, Default)]
pub struct SimpleQuote {
    value: RwLock<Option<f64>>,
    notifier: Observable,
}

impl SimpleQuote {
    /// Creates a quote with a value.
    pub fn new(value: f64) -> Self {
        Self {
            value: RwLock::new(Some(value)),
            notifier: Observable::new(),
        }
    }

    /// Creates a quote with no value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replaces the value and notifies observers if it changed.
    pub fn set_value(&self, value: Option<f64>) {
        let changed = {
            let mut slot = match self.value.write() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            let changed = *slot != value;
            *slot = value;
            changed
        };
        if changed {
            self.notifier.notify_observers();
        }
    }
}

impl Observe for SimpleQuote {
    fn observable(&self) -> &Observable {
        &self.notifier
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Result<f64, MarketDataError> {
        let slot = match self.value.read() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.ok_or(MarketDataError::MissingQuote)
    }
}
