pub mod defaults;
pub mod settings;

pub use defaults::DefaultConfig;
pub use settings::{
    AnalysisConfig, EndpointConfig, OutputConfig, ServerConfig, Settings, SuggestionConfig,
    ENDPOINT_ENV,
};
