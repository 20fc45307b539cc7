//! Hodgkin-Huxley gating kinetics
//!
//! Voltage-dependent rate constants (ms⁻¹) and steady-state values for the
//! sodium activation (m), sodium inactivation (h) and potassium activation
//! (n) gates, in the classic squid-axon form with voltages relative to rest.
//!
//! ```text
//! αn(V) = 0.01 (10 - V) / (exp((10 - V)/10) - 1)     βn(V) = 0.125 exp(-V/80)
//! αm(V) = 0.1  (25 - V) / (exp((25 - V)/10) - 1)     βm(V) = 4 exp(-V/18)
//! αh(V) = 0.07 exp(-V/20)                             βh(V) = 1 / (exp((30 - V)/10) + 1)
//! ```
//!
//! αn and αm have removable singularities at 10 mV and 25 mV; those points
//! return the analytic limits (0.1 and 1.0). Steady states are defined for
//! every finite V; at extreme potentials they saturate to exactly 0 or 1.

/// Voltage at which αn has its removable singularity (mV)
pub const ALPHA_N_POLE: f64 = 10.0;

/// Voltage at which αm has its removable singularity (mV)
pub const ALPHA_M_POLE: f64 = 25.0;

/// Potassium activation opening rate
pub fn alpha_n(v: f64) -> f64 {
    if v == ALPHA_N_POLE {
        return 0.1;
    }
    0.01 * (ALPHA_N_POLE - v) / (((ALPHA_N_POLE - v) / 10.0).exp() - 1.0)
}

/// Potassium activation closing rate
pub fn beta_n(v: f64) -> f64 {
    0.125 * (-v / 80.0).exp()
}

/// Sodium activation opening rate
pub fn alpha_m(v: f64) -> f64 {
    if v == ALPHA_M_POLE {
        return 1.0;
    }
    0.1 * (ALPHA_M_POLE - v) / (((ALPHA_M_POLE - v) / 10.0).exp() - 1.0)
}

/// Sodium activation closing rate
pub fn beta_m(v: f64) -> f64 {
    4.0 * (-v / 18.0).exp()
}

/// Sodium inactivation opening rate
pub fn alpha_h(v: f64) -> f64 {
    0.07 * (-v / 20.0).exp()
}

/// Sodium inactivation closing rate
pub fn beta_h(v: f64) -> f64 {
    1.0 / (((30.0 - v) / 10.0).exp() + 1.0)
}

/// Steady-state potassium activation
pub fn n_infinity(v: f64) -> f64 {
    steady_state(alpha_n(v), beta_n(v))
}

/// Steady-state sodium activation
pub fn m_infinity(v: f64) -> f64 {
    steady_state(alpha_m(v), beta_m(v))
}

/// Steady-state sodium inactivation
pub fn h_infinity(v: f64) -> f64 {
    steady_state(alpha_h(v), beta_h(v))
}

/// `α / (α + β)`, saturating to 1 or 0 when one rate overflows
///
/// Far outside the physiological range one exponential overflows while the
/// other rate stays finite (αh at V below about -14200 mV, βm and βn at large
/// negative V), and the plain quotient would be `inf / inf`.
#[inline]
fn steady_state(alpha: f64, beta: f64) -> f64 {
    match (alpha.is_infinite(), beta.is_infinite()) {
        (true, false) => 1.0,
        (false, true) => 0.0,
        _ => alpha / (alpha + beta),
    }
}

/// Explicit Euler update of one gate: `x + dt * (α(1 - x) - βx)`
#[inline]
pub fn euler_gate(x: f64, alpha: f64, beta: f64, dt: f64) -> f64 {
    x + dt * (alpha * (1.0 - x) - beta * x)
}
