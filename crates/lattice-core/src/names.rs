//! Well-known value names.
//!
//! A calculation function may produce any name it likes; these constants
//! just keep the common risk measures spelled consistently across catalogs,
//! configurations and tests.

/// Present value of the target.
pub const PRESENT_VALUE: &str = "Present Value";

/// Fair value of the target.
pub const FAIR_VALUE: &str = "Fair Value";

/// Market value of the target.
pub const MARKET_VALUE: &str = "Market Value";

/// Discount curve for a currency.
pub const DISCOUNT_CURVE: &str = "Discount Curve";

/// Yield curve for a currency.
pub const YIELD_CURVE: &str = "Yield Curve";

/// Forward curve for a currency or index.
pub const FORWARD_CURVE: &str = "Forward Curve";

/// Volatility surface for an underlying.
pub const VOLATILITY_SURFACE: &str = "Volatility Surface";

/// Sensitivity of present value to a one basis point rate shift.
pub const PV01: &str = "PV01";

/// First-order price sensitivity.
pub const DELTA: &str = "Delta";

/// Second-order price sensitivity.
pub const GAMMA: &str = "Gamma";

/// Sensitivity to volatility.
pub const VEGA: &str = "Vega";

/// Value at risk of the target.
pub const VALUE_AT_RISK: &str = "Value At Risk";
