//! Unit tests for session configuration parsing.

use std::collections::HashMap;
use std::path::PathBuf;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;

struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("tracker-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write temporary key file");
        Self { path }
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn release_key() -> TempKeyFile {
    TempKeyFile::new(SESSION_KEY_RELEASE_MIN_LEN)
}

fn release_vars(key: &TempKeyFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path_str()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(_) => panic!("release configuration should be rejected"),
        Err(error) => error,
    }
}

#[rstest]
fn release_accepts_complete_settings(release_key: TempKeyFile) {
    let settings = session_settings_from_env(&mock_env(release_vars(&release_key)), BuildMode::Release)
        .expect("complete settings are valid");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_rejects_missing_toggle(release_key: TempKeyFile, #[case] name: &'static str) {
    let mut vars = release_vars(&release_key);
    vars.remove(name);

    let error = release_error(vars);

    assert!(matches!(error, SessionConfigError::MissingEnv { name: missing } if missing == name));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
#[case(SAMESITE_ENV, "sideways")]
fn release_rejects_invalid_toggle(
    release_key: TempKeyFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&release_key);
    vars.insert(name, value.to_owned());

    let error = release_error(vars);

    assert!(matches!(error, SessionConfigError::InvalidEnv { name: invalid, .. } if invalid == name));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_key: TempKeyFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    assert!(matches!(release_error(vars), SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_same_site_none_without_secure_cookie(release_key: TempKeyFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    assert!(matches!(release_error(vars), SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_rejects_unreadable_key_file(release_key: TempKeyFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(KEY_FILE_ENV, "/nonexistent/tracker/session_key".to_owned());

    assert!(matches!(release_error(vars), SessionConfigError::KeyRead { .. }));
}

#[rstest]
#[case(BuildMode::Release, SESSION_KEY_FLOOR)]
#[case(BuildMode::Debug, SESSION_KEY_FLOOR - 1)]
fn short_keys_are_rejected(#[case] mode: BuildMode, #[case] length: usize) {
    let key = TempKeyFile::new(length);
    let vars = release_vars(&key);

    let result = session_settings_from_env(&mock_env(vars), mode);

    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length: reported, .. }) if reported == length
    ));
}

#[rstest]
fn debug_defaults_use_secure_lax_cookie() {
    let vars = HashMap::from([(KEY_FILE_ENV, "/nonexistent/tracker/session_key".to_owned())]);

    let settings = session_settings_from_env(&mock_env(vars), BuildMode::Debug)
        .expect("debug defaults succeed");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_invalid_same_site_falls_back_to_lax(release_key: TempKeyFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(SAMESITE_ENV, "unexpected".to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug falls back");

    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn fingerprint_is_stable_short_hex(release_key: TempKeyFile) {
    let env = mock_env(release_vars(&release_key));
    let first = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    let second = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");

    let fingerprint = first.key_fingerprint();

    assert_eq!(fingerprint.len(), FINGERPRINT_BYTES * 2);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(fingerprint, second.key_fingerprint());
}
