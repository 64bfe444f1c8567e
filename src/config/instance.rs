//! config singleton management stuff
use {
    crate::config::options::TagcompleteCfg,
    color_eyre::{Result, eyre::Context},
    std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// global config instance
///
/// holds the defaults until [`init_config`] loads the real thing
static CONFIG: LazyLock<RwLock<TagcompleteCfg>> =
    LazyLock::new(|| RwLock::new(TagcompleteCfg::default()));

/// load the config from disk and the environment into the global instance
///
/// # Errors
///
/// returns an error if the config fails to load or validate
pub fn init_config() -> Result<()> {
    reload_config()
}

/// get a ro ref to the config
///
/// # Errors
///
/// returns an error if the config lock is poisoned
pub fn config() -> Result<RwLockReadGuard<'static, TagcompleteCfg>> {
    CONFIG
        .read()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration lock poisoned: {}", e))
}

/// get a rw ref to the config
///
/// # Errors
///
/// returns an error if the config lock is poisoned
pub fn config_mut() -> Result<RwLockWriteGuard<'static, TagcompleteCfg>> {
    CONFIG
        .write()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration lock poisoned: {}", e))
}

/// reload cfg from disk
///
/// # Errors
///
/// returns an error if the config fails to load or validate
pub fn reload_config() -> Result<()> {
    let new_config = TagcompleteCfg::load().wrap_err("Failed to reload config from disk")?;
    set_config(new_config)
}

/// replace the config wholesale
///
/// # Errors
///
/// returns an error if the config lock is poisoned
pub fn set_config(new_config: TagcompleteCfg) -> Result<()> {
    let mut config = config_mut().wrap_err("failed to acquire write lock for cfg reload")?;
    *config = new_config;
    Ok(())
}

/// get a specific config value with a default fallback
pub fn get_or_default<T, F>(getter: F, default: T) -> T
where
    F: FnOnce(&TagcompleteCfg) -> Option<T>,
    T: Clone,
{
    config()
        .ok()
        .and_then(|cfg| getter(&cfg))
        .unwrap_or(default)
}
