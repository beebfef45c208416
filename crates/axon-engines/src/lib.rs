mod config;
mod population;
mod species;

pub use config::{PopulationConfig, ReproductionConfig, SpeciesSetConfig, StagnationConfig};
pub use population::Population;
pub use species::{Species, SpeciesSet};

pub use axon_core::*;
pub use axon_error::{AxonError, AxonResult, ErrorCode, axon_bail, axon_err, ensure};

pub fn init_logging() {
    use std::sync::Once;
    static INIT_LOGGING: Once = Once::new();

    INIT_LOGGING.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        std::panic::set_hook(Box::new(|info| {
            tracing::error!("PANIC: {}", info);
        }));

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .compact(),
            )
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    });
}
