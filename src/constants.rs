//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Response parser constants
pub mod parser {
    /// Wall-clock budget for the sandboxed expression tier (milliseconds)
    pub const SANDBOX_TIMEOUT_MS: u64 = 1_000;

    /// Maximum object/array nesting accepted by the literal parsers
    pub const MAX_NESTING_DEPTH: usize = 256;

    /// Largest input the sandboxed tier will look at (2 MiB)
    pub const MAX_SANDBOX_INPUT_BYTES: usize = 2 * 1024 * 1024;

    /// Deadline is checked once per this many scanned tokens
    pub const DEADLINE_CHECK_INTERVAL: usize = 256;

    /// Characters of raw text kept in error previews
    pub const ERROR_PREVIEW_CHARS: usize = 200;
}

/// Cost normalization constants
pub mod cost {
    /// Key suffixes that mark a field as cost-bearing (matched case-insensitively)
    pub const DEFAULT_SUFFIXES: &[&str] = &["cost", "price", "fare", "fee", "amount", "total"];

    /// Container keys whose scalar members are all cost-bearing
    pub const DEFAULT_BREAKDOWN_CONTAINERS: &[&str] = &["budgetBreakdown", "costBreakdown"];

    /// Keys never converted even when they match a suffix
    pub const DEFAULT_EXCLUSIONS: &[&str] = &["currency", "costNotes"];
}

/// Weather aggregation constants
pub mod weather {
    /// Days ahead the live forecast provider can cover
    pub const DEFAULT_HORIZON_DAYS: u32 = 14;

    /// Upper bound on concurrent destination lookups
    pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

    /// Timeout for a single geocoder/forecast/estimator call (seconds)
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Average daily maximum at or above which heat advice is added (°C)
    pub const HOT_AVG_MAX_C: f64 = 30.0;

    /// Average daily minimum at or below which cold advice is added (°C)
    pub const COLD_AVG_MIN_C: f64 = 5.0;

    /// Average daily precipitation at or above which rain advice is added (mm)
    pub const WET_AVG_PRECIP_MM: f64 = 5.0;

    /// Average daily precipitation below which a day counts as dry (mm)
    pub const DRY_AVG_PRECIP_MM: f64 = 1.0;

    /// Most recent days the historical archive has not published yet
    pub const ARCHIVE_LAG_DAYS: u64 = 5;

    /// Pleasant band for average daily maximum (°C)
    pub const PLEASANT_MIN_C: f64 = 15.0;
    pub const PLEASANT_MAX_C: f64 = 28.0;
}

/// Request validation constants
pub mod request {
    /// Maximum destinations in one generation request
    pub const MAX_DESTINATIONS: usize = 5;

    /// Maximum trip length in days
    pub const MAX_DURATION_DAYS: u32 = 30;
}

/// Network constants
pub mod network {
    /// Open-Meteo forecast API base
    pub const OPEN_METEO_FORECAST_BASE: &str = "https://api.open-meteo.com/v1";

    /// Open-Meteo geocoding API base
    pub const OPEN_METEO_GEOCODING_BASE: &str = "https://geocoding-api.open-meteo.com/v1";

    /// Open-Meteo historical archive API base
    pub const OPEN_METEO_ARCHIVE_BASE: &str = "https://archive-api.open-meteo.com/v1";

    /// User agent sent to weather providers
    pub const USER_AGENT: &str = concat!("itinerary-guard/", env!("CARGO_PKG_VERSION"));
}
