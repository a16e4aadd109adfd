pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, ApiConfig, EndpointConfig, RunConfig};
pub use core::{
    etl::{EtlEngine, RunSummary},
    fetch::{AverageInterestRatesSource, SecuritiesSalesSource},
    portfolio::PortfolioAssembler,
};
pub use domain::model::{Portfolio, Record, ResultSet, SourceKind};
pub use utils::error::{EtlError, RemoteRequestError, Result};
