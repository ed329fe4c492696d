//! Shared test fixtures for integration tests.

use rand::SeedableRng;
use rand::rngs::StdRng;

use dwellsim::config::{Detail, ScenarioConfig, Settings};
use dwellsim::sim::DayType;
use dwellsim::tables::Dataset;

/// Default run settings (two residents, January weekday, seed 42).
pub fn default_settings() -> Settings {
    let (mut settings, warnings) = ScenarioConfig::baseline().settings();
    assert!(warnings.is_empty());
    settings.seed = Some(42);
    settings.detail = Detail::PerEntity;
    settings
}

/// Settings for a summer weekend with a full household.
#[allow(dead_code)]
pub fn summer_weekend_settings() -> Settings {
    let mut settings = default_settings();
    settings.month = 7;
    settings.day_type = DayType::Weekend;
    settings.residents = 5;
    settings
}

/// Built-in demo dataset shared across integration tests.
pub fn demo_dataset() -> Dataset {
    Dataset::demo()
}

/// Seeded generator matching the settings' seed.
pub fn seeded_rng(settings: &Settings) -> StdRng {
    StdRng::seed_from_u64(settings.seed.unwrap_or(42))
}
