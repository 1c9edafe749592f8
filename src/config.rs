use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hjerne")]
#[command(about = "Runs the hjerne service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hjerne")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: i32,
}

impl App {
    pub fn get_db(&self) -> &str {
        return &self.database;
    }

    pub fn get_port(&self) -> i32 {
        return self.port;
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_token_expiry_hours() -> i64 {
    24 * 7
}

fn default_issuer() -> String {
    "hjerne".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    pub auth: Auth,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // Handle default values like ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        println!("Warning: Environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars_default_value() {
        let yaml = "secret: ${HJERNE_TEST_UNSET_VAR:-fallback}";
        let substituted = Config::substitute_env_vars(yaml).unwrap();
        assert_eq!(substituted, "secret: fallback");
    }

    #[test]
    fn test_substitute_env_vars_set_value() {
        // SAFETY: test environment
        unsafe { env::set_var("HJERNE_TEST_SET_VAR", "sekrit") };
        let yaml = "secret: ${HJERNE_TEST_SET_VAR}";
        let substituted = Config::substitute_env_vars(yaml).unwrap();
        assert_eq!(substituted, "secret: sekrit");
        // SAFETY: test environment
        unsafe { env::remove_var("HJERNE_TEST_SET_VAR") };
    }

    #[test]
    fn test_auth_section_defaults() {
        let yaml = r#"
app:
  database: hjerne.db
  port: 8080
auth:
  jwt_secret: test-secret
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.auth.token_expiry_hours, 24 * 7);
        assert_eq!(cfg.auth.issuer, "hjerne");
    }
}
