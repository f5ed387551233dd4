//! Closed-form Black-76 Greeks against central finite differences.
//!
//! The market is parameterised by spot S, rates r and q, volatility and
//! maturity T, with F = S·exp((r − q)T), D = exp(−rT) and σ = vol·√T.

use approx::assert_relative_eq;
use pricer_models::analytical::{BlackCalculator, OptionType, Payoff};

#[derive(Clone, Copy)]
struct Market {
    spot: f64,
    r: f64,
    q: f64,
    vol: f64,
    maturity: f64,
}

impl Market {
    fn base() -> Self {
        Self {
            spot: 100.0,
            r: 0.03,
            q: 0.01,
            vol: 0.25,
            maturity: 1.5,
        }
    }

    fn forward(&self) -> f64 {
        self.spot * ((self.r - self.q) * self.maturity).exp()
    }

    fn calculator(&self, payoff: Payoff) -> BlackCalculator {
        BlackCalculator::new(
            payoff,
            self.forward(),
            self.vol * self.maturity.sqrt(),
            (-self.r * self.maturity).exp(),
        )
        .unwrap()
    }

    fn value(&self, payoff: Payoff) -> f64 {
        self.calculator(payoff).value()
    }
}

fn central(f: impl Fn(f64) -> f64, x: f64, h: f64) -> f64 {
    (f(x + h) - f(x - h)) / (2.0 * h)
}

fn payoffs() -> Vec<Payoff> {
    let forward = Market::base().forward();
    let mut payoffs = Vec::new();
    for option_type in [OptionType::Call, OptionType::Put] {
        for strike in [0.0, forward, 3.0 * forward, 0.6 * forward] {
            payoffs.push(Payoff::plain_vanilla(option_type, strike));
        }
        payoffs.push(Payoff::cash_or_nothing(option_type, 0.9 * forward, 10.0));
        payoffs.push(Payoff::asset_or_nothing(option_type, 1.1 * forward));
        payoffs.push(Payoff::gap(option_type, forward, 0.95 * forward));
    }
    payoffs
}

fn assert_close(analytic: f64, numeric: f64, payoff: &Payoff, greek: &str) {
    assert!(
        approx::relative_eq!(analytic, numeric, epsilon = 1e-5, max_relative = 1e-5),
        "{greek} mismatch for {payoff}: analytic {analytic}, numeric {numeric}"
    );
}

// ==========================================================
// Forward and spot Greeks
// ==========================================================

#[test]
fn test_delta_forward() {
    let m = Market::base();
    for payoff in payoffs() {
        let calc = m.calculator(payoff);
        let std_dev = calc.std_dev();
        let discount = calc.discount();
        let numeric = central(
            |f| BlackCalculator::new(payoff, f, std_dev, discount).unwrap().value(),
            m.forward(),
            1e-3,
        );
        assert_close(calc.delta_forward(), numeric, &payoff, "delta_forward");
    }
}

#[test]
fn test_delta_and_gamma_spot() {
    let m = Market::base();
    for payoff in payoffs() {
        let calc = m.calculator(payoff);
        let value_at = |s: f64| Market { spot: s, ..m }.value(payoff);
        let delta_at = |s: f64| {
            Market { spot: s, ..m }
                .calculator(payoff)
                .delta(s)
                .unwrap()
        };

        let delta = calc.delta(m.spot).unwrap();
        assert_close(delta, central(value_at, m.spot, 1e-3), &payoff, "delta");
        assert_close(
            calc.gamma(m.spot).unwrap(),
            central(delta_at, m.spot, 1e-3),
            &payoff,
            "gamma",
        );
    }
}

#[test]
fn test_gamma_forward() {
    let m = Market::base();
    for payoff in payoffs() {
        let calc = m.calculator(payoff);
        let (std_dev, discount) = (calc.std_dev(), calc.discount());
        let numeric = central(
            |f| {
                BlackCalculator::new(payoff, f, std_dev, discount)
                    .unwrap()
                    .delta_forward()
            },
            m.forward(),
            1e-3,
        );
        assert_close(calc.gamma_forward(), numeric, &payoff, "gamma_forward");
    }
}

// ==========================================================
// Volatility, time and rate Greeks
// ==========================================================

#[test]
fn test_vega() {
    let m = Market::base();
    for payoff in payoffs() {
        let numeric = central(|v| Market { vol: v, ..m }.value(payoff), m.vol, 1e-5);
        let analytic = m.calculator(payoff).vega(m.maturity).unwrap();
        assert_close(analytic, numeric, &payoff, "vega");
    }
}

#[test]
fn test_theta() {
    let m = Market::base();
    for payoff in payoffs() {
        let numeric = -central(
            |t| Market { maturity: t, ..m }.value(payoff),
            m.maturity,
            1e-5,
        );
        let analytic = m.calculator(payoff).theta(m.spot, m.maturity).unwrap();
        assert_close(analytic, numeric, &payoff, "theta");
    }
}

#[test]
fn test_rho() {
    let m = Market::base();
    for payoff in payoffs() {
        let numeric = central(|r| Market { r, ..m }.value(payoff), m.r, 1e-6);
        let analytic = m.calculator(payoff).rho(m.maturity).unwrap();
        assert_close(analytic, numeric, &payoff, "rho");
    }
}

#[test]
fn test_dividend_rho() {
    let m = Market::base();
    for payoff in payoffs() {
        let numeric = central(|q| Market { q, ..m }.value(payoff), m.q, 1e-6);
        let analytic = m.calculator(payoff).dividend_rho(m.maturity).unwrap();
        assert_close(analytic, numeric, &payoff, "dividend_rho");
    }
}

#[test]
fn test_strike_sensitivity() {
    let m = Market::base();
    let forward = m.forward();
    for option_type in [OptionType::Call, OptionType::Put] {
        for strike in [0.5 * forward, forward, 2.0 * forward] {
            let payoff = Payoff::plain_vanilla(option_type, strike);
            let numeric = central(
                |k| m.value(Payoff::plain_vanilla(option_type, k)),
                strike,
                1e-3,
            );
            let analytic = m.calculator(payoff).strike_sensitivity();
            assert_close(analytic, numeric, &payoff, "strike_sensitivity");
        }
    }
}

// ==========================================================
// Degenerate strikes
// ==========================================================

#[test]
fn test_zero_strike_call_is_discounted_forward() {
    let m = Market::base();
    let calc = m.calculator(Payoff::plain_vanilla(OptionType::Call, 0.0));
    let df = (-m.r * m.maturity).exp();

    assert_relative_eq!(calc.value(), df * m.forward(), max_relative = 1e-14);
    assert_eq!(calc.vega(m.maturity).unwrap(), 0.0);
    assert_eq!(calc.gamma(m.spot).unwrap(), 0.0);
    assert_relative_eq!(calc.rho(m.maturity).unwrap(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(
        calc.theta(m.spot, m.maturity).unwrap(),
        m.q * calc.value(),
        max_relative = 1e-10
    );
}

#[test]
fn test_deep_out_of_the_money_greeks_are_finite() {
    let m = Market::base();
    for option_type in [OptionType::Call, OptionType::Put] {
        let strike = match option_type {
            OptionType::Call => 50.0 * m.forward(),
            OptionType::Put => 0.02 * m.forward(),
        };
        let calc = m.calculator(Payoff::plain_vanilla(option_type, strike));
        let greeks = [
            calc.value(),
            calc.delta_forward(),
            calc.delta(m.spot).unwrap(),
            calc.gamma(m.spot).unwrap(),
            calc.vega(m.maturity).unwrap(),
            calc.theta(m.spot, m.maturity).unwrap(),
            calc.rho(m.maturity).unwrap(),
            calc.dividend_rho(m.maturity).unwrap(),
        ];
        for g in greeks {
            assert!(g.is_finite());
            assert!(g.abs() < 1e-6);
        }
    }
}
