use anyhow::Result;

use crate::auth::CredentialStore;
use crate::runtime::Runtime;

/// Manages the stored API key. A positional key stores it, `--reset` removes
/// it, and `--show` (or no arguments) reports what is stored.
#[tracing::instrument(skip(runtime, api_key))]
pub fn auth<R: Runtime>(
    runtime: &R,
    api_key: Option<&str>,
    show: bool,
    reset: bool,
) -> Result<()> {
    let store = CredentialStore::new(runtime);

    if reset {
        store.reset()?;
        println!("API key removed");
        return Ok(());
    }

    if !show && let Some(key) = api_key {
        store.set_key(key)?;
        println!("API key saved");
        return Ok(());
    }

    match store.stored_key()? {
        Some(key) => println!("API key: {}", key),
        None => println!("No API key stored. Run `glossa auth <api-key>` to set one."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    fn runtime_with_config_dir() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_config_dir()
            .returning(|| Some(PathBuf::from("/home/user/.config")));
        runtime
    }

    #[test]
    fn test_auth_stores_positional_key() {
        let mut runtime = runtime_with_config_dir();
        runtime.expect_exists().returning(|_| false);
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|_, contents| String::from_utf8_lossy(contents).contains("new-key"))
            .times(1)
            .returning(|_, _| Ok(()));

        auth(&runtime, Some("new-key"), false, false).unwrap();
    }

    #[test]
    fn test_auth_reset_removes_key() {
        let mut runtime = runtime_with_config_dir();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_remove_file().times(1).returning(|_| Ok(()));

        auth(&runtime, None, false, true).unwrap();
    }

    #[test]
    fn test_auth_show_does_not_write() {
        let mut runtime = runtime_with_config_dir();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"apiKey": "stored"}"#.to_string()));

        auth(&runtime, Some("ignored"), true, false).unwrap();
    }

    #[test]
    fn test_auth_without_args_reports_missing_key() {
        let mut runtime = runtime_with_config_dir();
        runtime.expect_exists().returning(|_| false);

        auth(&runtime, None, false, false).unwrap();
    }
}
