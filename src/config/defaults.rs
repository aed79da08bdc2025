use anyhow::Result;

use crate::config::Settings;

pub struct DefaultConfig;

impl DefaultConfig {
    /// Contents written by `promptframe init`.
    pub fn config_file_contents() -> Result<String> {
        let body = toml::to_string_pretty(&Settings::default())?;
        Ok(format!(
            "# promptframe configuration\n\
             # The upstream API key is read from the variable named by server.api_key_env.\n\n\
             {body}"
        ))
    }
}
