use std::{env, net::SocketAddr, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub bind_port: u16,
    pub management_path: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MOCK_DATA_DIR must not be empty")]
    EmptyDataDir,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("MOCK_MANAGEMENT_PATH must start with /")]
    InvalidManagementPath,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match lookup("MOCK_DATA_DIR").map(|value| value.trim().to_string()) {
            Some(value) if value.is_empty() => return Err(ConfigError::EmptyDataDir),
            Some(value) => PathBuf::from(value),
            None => PathBuf::from("./mockdata"),
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = lookup("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);

        let management_path = lookup("MOCK_MANAGEMENT_PATH")
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| "/mock".to_string());
        if !management_path.starts_with('/') {
            return Err(ConfigError::InvalidManagementPath);
        }

        let config = Self {
            data_dir,
            bind_addr,
            bind_port,
            management_path,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = parse(&[]).expect("config should parse");
        assert_eq!(config.data_dir, PathBuf::from("./mockdata"));
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.management_path, "/mock");
    }

    #[test]
    fn overrides_are_applied() {
        let config = parse(&[
            ("MOCK_DATA_DIR", "/var/lib/mocks"),
            ("BIND_ADDR", "0.0.0.0"),
            ("BIND_PORT", "9000"),
            ("MOCK_MANAGEMENT_PATH", "/ui/mocks"),
        ])
        .expect("config should parse");

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/mocks"));
        assert_eq!(
            config.bind_socket().expect("valid socket"),
            "0.0.0.0:9000".parse().expect("socket literal")
        );
        assert_eq!(config.management_path, "/ui/mocks");
    }

    #[test]
    fn empty_data_dir_fails() {
        let err = parse(&[("MOCK_DATA_DIR", "  ")]).expect_err("expected empty dir error");
        assert!(matches!(err, ConfigError::EmptyDataDir));
    }

    #[test]
    fn invalid_port_fails() {
        let err = parse(&[("BIND_PORT", "70000")]).expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn relative_management_path_fails() {
        let err = parse(&[("MOCK_MANAGEMENT_PATH", "mock")])
            .expect_err("expected invalid management path error");
        assert!(matches!(err, ConfigError::InvalidManagementPath));
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let err = parse(&[("BIND_ADDR", "not an address")]).expect_err("expected socket error");
        assert!(matches!(err, ConfigError::InvalidSocket));
    }
}
