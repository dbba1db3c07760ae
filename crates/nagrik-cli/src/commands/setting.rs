use std::path::Path;

use nagrik_core::models::SettingValue;

use crate::commands::common::open_store;
use crate::error::CliError;

pub async fn run_setting_get(key: &str, db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path).await?;
    match store.get_setting(key).await? {
        Some(value) => println!("{value}"),
        None => println!("(not set)"),
    }
    Ok(())
}

pub async fn run_setting_set(
    key: &str,
    raw: &str,
    db_path: &Path,
) -> Result<SettingValue, CliError> {
    let value = SettingValue::infer(raw);
    let store = open_store(db_path).await?;
    store.put_setting(key, &value).await?;
    println!("{} = {value}", key.trim());
    Ok(value)
}

pub async fn run_setting_list(db_path: &Path) -> Result<(), CliError> {
    let store = open_store(db_path).await?;
    let settings = store.list_settings().await?;
    if settings.is_empty() {
        println!("No settings stored.");
    }
    for setting in settings {
        println!("{} = {}", setting.key, setting.value);
    }
    Ok(())
}
