//! `wayfarer init`: scaffold a configuration file and an env template.

use super::output::Output;
use crate::utils::toml_config::{AiBackend, WayfarerConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// wayfarer.toml exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct InitConfig {
    pub path: PathBuf,
    pub force: bool,
    pub ollama: bool,
}

pub fn run(config: &InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing wayfarer");

    let config_path = config.path.join("wayfarer.toml");
    if config_path.exists() && !config.force {
        output.warning("wayfarer.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = fs::create_dir_all(&config.path) {
        output.error(&format!("Failed to create {}: {}", config.path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let toml_content = match generate_toml(config.ollama) {
        Ok(content) => content,
        Err(e) => {
            output.error(&format!("Failed to render configuration: {}", e));
            return InitResult::Error(e);
        }
    };
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create wayfarer.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("wayfarer.toml");

    let env_path = config.path.join(".env.example");
    match write_file(&env_path, ENV_EXAMPLE, config.force) {
        Ok(true) => output.created(".env.example"),
        Ok(false) => output.skipped(".env.example", "already exists"),
        Err(e) => {
            output.error(&format!("Failed to create .env.example: {}", e));
            return InitResult::Error(e.to_string());
        }
    }

    output.header("Next Steps");
    output.command("cp .env.example .env");
    if config.ollama {
        output.command("ollama serve");
    } else {
        output.hint("Set WAYFARER_AI_API_KEY in .env (comma-separate several keys to rotate)");
    }
    output.command("wayfarer run");

    InitResult::Success
}

/// Returns whether the file was written.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_toml(ollama: bool) -> Result<String, String> {
    let mut config = WayfarerConfig::default();
    if ollama {
        config.ai.backend = AiBackend::Ollama;
        config.ai.api_base = "http://localhost:11434".to_string();
        config.ai.model = "llama3.2:3b".to_string();
    }
    let body = config.to_toml().map_err(|e| e.to_string())?;
    Ok(format!(
        "# Wayfarer configuration\n\
         # Generated by: wayfarer init\n\
         #\n\
         # Secrets are read from the environment variables named by the *_env keys.\n\n\
         {}",
        body
    ))
}

const ENV_EXAMPLE: &str = "# AI endpoint key(s), comma-separated to rotate between several\n\
WAYFARER_AI_API_KEY=\n\
\n\
# Hosted Postgres (PostgREST) for saved itineraries\n\
WAYFARER_SUPABASE_URL=\n\
WAYFARER_SUPABASE_ANON_KEY=\n\
\n\
# Log filter, e.g. wayfarer=debug\n\
RUST_LOG=info\n";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_config(dir: &TempDir) -> InitConfig {
        InitConfig {
            path: dir.path().to_path_buf(),
            force: false,
            ollama: false,
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let result = run(&init_config(&dir), &Output::no_color());
        assert_eq!(result, InitResult::Success);

        let config = WayfarerConfig::load(dir.path().join("wayfarer.toml")).unwrap();
        assert_eq!(config.persistence.table, "saved_itineraries");
        let env = fs::read_to_string(dir.path().join(".env.example")).unwrap();
        assert!(env.contains("WAYFARER_AI_API_KEY="));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wayfarer.toml"), "# mine").unwrap();
        let result = run(&init_config(&dir), &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(
            fs::read_to_string(dir.path().join("wayfarer.toml")).unwrap(),
            "# mine"
        );
    }

    #[test]
    fn test_init_force_with_ollama() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wayfarer.toml"), "# mine").unwrap();
        let config = InitConfig {
            force: true,
            ollama: true,
            ..init_config(&dir)
        };
        assert_eq!(run(&config, &Output::no_color()), InitResult::Success);
        let loaded = WayfarerConfig::load(dir.path().join("wayfarer.toml")).unwrap();
        assert_eq!(loaded.ai.backend, AiBackend::Ollama);
    }
}
