use serde::{Deserialize, Serialize};

/// Output settings shared by every dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Convert exported keys from snake_case to camelCase
    pub camel_case: bool,
    /// Indent the text produced by the default serializer
    pub pretty: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            camel_case: true,
            pretty: false,
        }
    }
}

impl DumpConfig {
    /// Defaults, overridden by an optional `jsonapi.*` file, then by
    /// `JSONAPI_CAMEL_CASE` / `JSONAPI_PRETTY`.
    pub fn load() -> anyhow::Result<Self> {
        // .env is optional
        dotenvy::dotenv().ok();

        Self::layered(Some("jsonapi"), Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("JSONAPI")
            .prefix_separator("_")
            .try_parsing(true)
    }

    /// `file` names an optional config file, extension excluded.
    fn layered(file: Option<&str>, environment: config::Environment) -> anyhow::Result<Self> {
        let mut config = config::Config::builder()
            .add_source(config::Config::try_from(&DumpConfig::default())?);

        if let Some(file) = file {
            config = config.add_source(config::File::with_name(file).required(false));
        }
        config = config.add_source(environment);

        let dump_config: DumpConfig = config.build()?.try_deserialize()?;

        log::debug!("Loaded dump configuration: {:?}", dump_config);
        Ok(dump_config)
    }

    /// Key transformation applied to attribute, meta and relationship names
    pub fn export_key(&self, name: &str) -> String {
        if self.camel_case {
            crate::model::snake_to_camel_case(name)
        } else {
            name.to_string()
        }
    }
}
