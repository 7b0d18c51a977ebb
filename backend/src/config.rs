use log::warn;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "models/diabetes_xgb.json";

/// Server settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
    pub static_dir: PathBuf,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparseable numbers fall back
    /// to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("PORT={raw:?} is not a valid port, using 8080");
                8080
            }),
            None => 8080,
        };
        let workers = match lookup("WORKERS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(workers) if workers > 0 => workers,
                _ => {
                    warn!("WORKERS={raw:?} is not a positive number, using the CPU count");
                    num_cpus::get()
                }
            },
            None => num_cpus::get(),
        };

        let allowed_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => vec![
                format!("http://localhost:{port}"),
                format!("http://127.0.0.1:{port}"),
            ],
        };

        ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            workers,
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./static")),
            allowed_origins,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.workers, num_cpus::get());
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.static_dir, PathBuf::from("./static"));
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:8080", "http://127.0.0.1:8080"]
        );
    }

    #[test]
    fn origins_do_not_follow_a_wildcard_host() {
        let config = config(&[("HOST", "0.0.0.0"), ("PORT", "9000")]);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:9000", "http://127.0.0.1:9000"]
        );
    }

    #[test]
    fn origins_from_a_comma_separated_list() {
        let config = config(&[(
            "CORS_ORIGINS",
            "https://clinic.example, http://localhost:3000,",
        )]);
        assert_eq!(
            config.allowed_origins,
            vec!["https://clinic.example", "http://localhost:3000"]
        );
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("WORKERS", "3"),
            ("MODEL_PATH", "/srv/model.onnx"),
        ]);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.workers, 3);
        assert_eq!(config.model_path, PathBuf::from("/srv/model.onnx"));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = config(&[("PORT", "eighty"), ("WORKERS", "0")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.workers, num_cpus::get());
    }
}
