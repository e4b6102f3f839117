use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub data_service: DataServiceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataServiceSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/data_service"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[data_service]\nbase_url = \"http://localhost:8000\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let parsed: ServiceConfig = settings.try_deserialize().unwrap();

        assert_eq!(parsed.data_service.base_url, "http://localhost:8000");
        assert_eq!(parsed.data_service.timeout_secs, 30);
        assert!(parsed.data_service.api_key.is_none());
    }
}
