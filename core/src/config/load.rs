use std::path::{Path, PathBuf};

use super::types::{AppConfig, BackendProvider, RemoteBackendConfig};

/// Get the default oncopanel data directory: ~/.oncopanel
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".oncopanel"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.oncopanel/config.toml (highest)
    let data_dir = get_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    // Update logging directory to use the data directory if not set
    if cfg
        .logging
        .directory
        .as_ref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        let logs_dir = data_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    // Environment variable overrides (Priority 0: highest)
    if let Ok(v) = std::env::var("ONCOPANEL_TASK_TIMEOUT_SECS") {
        if let Ok(secs) = v.trim().parse::<u64>() {
            cfg.orchestrator.task_timeout_secs = secs;
        }
    }

    if let Ok(v) = std::env::var("ONCOPANEL_BACKEND_URL") {
        if !v.trim().is_empty() {
            match &mut cfg.backend.provider {
                BackendProvider::Remote(remote) => remote.base_url = v,
                BackendProvider::Synthetic => {
                    cfg.backend.provider = BackendProvider::Remote(RemoteBackendConfig {
                        base_url: v,
                        ..RemoteBackendConfig::default()
                    });
                }
            }
        }
    }
    if let Ok(v) = std::env::var("ONCOPANEL_BACKEND_API_KEY") {
        if !v.trim().is_empty() {
            if let BackendProvider::Remote(remote) = &mut cfg.backend.provider {
                remote.api_key = v;
            }
        }
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DegradedSlotPolicy;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    // load_default reads HOME and ONCOPANEL_* from the process environment;
    // tests touching them must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_overrides() {
        std::env::remove_var("ONCOPANEL_TASK_TIMEOUT_SECS");
        std::env::remove_var("ONCOPANEL_BACKEND_URL");
        std::env::remove_var("ONCOPANEL_BACKEND_API_KEY");
    }

    #[test]
    fn empty_toml_falls_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.orchestrator.task_timeout_secs, 30);
        assert_eq!(cfg.orchestrator.degraded_slots, DegradedSlotPolicy::Annotate);
        assert!(matches!(cfg.backend.provider, BackendProvider::Synthetic));
        assert!(cfg.logging.enabled);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn zero_timeout_disables_the_deadline() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [orchestrator]
            task_timeout_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.orchestrator.task_timeout(), None);
    }

    #[test]
    fn load_default_prefers_the_home_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_overrides();
        let home = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", home.path());

        let data_dir = home.path().join(".oncopanel");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("config.toml"),
            "[orchestrator]\ntask_timeout_secs = 7\n",
        )
        .unwrap();

        let cfg = load_default().unwrap();
        assert_eq!(cfg.orchestrator.task_timeout_secs, 7);
        // Unset logging directory resolves under the data dir.
        assert_eq!(
            cfg.logging.directory.as_deref(),
            Some(data_dir.join("logs").to_string_lossy().as_ref())
        );
    }

    #[test]
    fn load_default_without_any_file_yields_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_overrides();
        let home = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", home.path());

        let cfg = load_default().unwrap();
        assert_eq!(cfg.orchestrator.task_timeout_secs, 30);
        assert!(matches!(cfg.backend.provider, BackendProvider::Synthetic));
    }

    #[test]
    fn env_overrides_beat_the_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let home = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", home.path());

        let data_dir = home.path().join(".oncopanel");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("config.toml"),
            "[orchestrator]\ntask_timeout_secs = 7\n",
        )
        .unwrap();

        std::env::set_var("ONCOPANEL_TASK_TIMEOUT_SECS", "3");
        // A URL override on a synthetic config promotes the provider.
        std::env::set_var("ONCOPANEL_BACKEND_URL", "https://predict.example.org");
        std::env::set_var("ONCOPANEL_BACKEND_API_KEY", "k-9");

        let cfg = load_default().unwrap();
        clear_overrides();

        assert_eq!(cfg.orchestrator.task_timeout_secs, 3);
        match cfg.backend.provider {
            BackendProvider::Remote(remote) => {
                assert_eq!(remote.base_url, "https://predict.example.org");
                assert_eq!(remote.api_key, "k-9");
                assert_eq!(remote.timeout_ms, 8000);
            }
            other => panic!("expected remote provider, got {other:?}"),
        }
    }

    #[test]
    fn remote_backend_parses_from_tagged_table() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [orchestrator]
            task_timeout_secs = 5
            degraded_slots = "omit"

            [backend]
            provider = "remote"
            base_url = "https://predict.example.org"
            api_key = "k-123"
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.orchestrator.task_timeout(),
            Some(std::time::Duration::from_secs(5))
        );
        assert_eq!(cfg.orchestrator.degraded_slots, DegradedSlotPolicy::Omit);
        match cfg.backend.provider {
            BackendProvider::Remote(remote) => {
                assert_eq!(remote.base_url, "https://predict.example.org");
                assert_eq!(remote.api_key, "k-123");
                assert_eq!(remote.timeout_ms, 8000);
            }
            other => panic!("expected remote provider, got {other:?}"),
        }
    }
}
