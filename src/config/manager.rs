//! 設定管理を行うモジュール

use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    T9nSettings,
};
use crate::input::translation::Translations;
use crate::merge::{
    CandidateChain,
    Languages,
    MergedView,
};
use crate::types::{
    KeyPath,
    KeyPathError,
};
use crate::value::Value;

/// 設定ファイル名
const CONFIG_FILE_NAME: &str = ".t9n.json";

/// `config_root` 直下の `.t9n.json` を読む
///
/// ファイルがなければ `Ok(None)`
fn read_settings_file(config_root: &Path) -> Result<Option<T9nSettings>, ConfigError> {
    let config_path = config_root.join(CONFIG_FILE_NAME);
    let content = match std::fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE_NAME} in {:?}, using defaults", config_root);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!("Read settings file {:?}", config_path);
    Ok(Some(serde_json::from_str(&content)?))
}

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: T9nSettings,

    /// 設定ファイルを読み込んだディレクトリ
    config_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: T9nSettings::default(), config_root: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `config_root` - `.t9n.json` を探すディレクトリ
    ///
    /// # Returns
    /// - `Ok(())`: 設定の読み込みとバリデーション成功
    /// - `Err(ConfigError)`: エラー
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, config_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from: {:?}", config_root);

        let settings = match config_root.as_deref() {
            Some(root) => read_settings_file(root)?.unwrap_or_default(),
            None => T9nSettings::default(),
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.config_root = config_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 設定を更新する
    ///
    /// # Errors
    /// - バリデーションエラー（現在の設定は変更されない）
    pub fn update_settings(&mut self, new_settings: T9nSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &T9nSettings {
        &self.current_settings
    }

    /// 設定ファイルのディレクトリを取得
    #[must_use]
    pub const fn config_root(&self) -> Option<&PathBuf> {
        self.config_root.as_ref()
    }

    /// 設定された言語で `base` を翻訳する
    ///
    /// 言語が設定されていない場合は `base` だけのビューを返す
    #[must_use]
    pub fn translate(&self, base: Value, translations: &Translations) -> MergedView {
        let languages = self.current_settings.languages().unwrap_or(Languages::Tags(Vec::new()));
        MergedView::new(CandidateChain::from_languages(base, translations, &languages))
    }

    /// 設定された区切り文字でキーパスを解析する
    ///
    /// # Errors
    /// - キーパスの構文エラー
    pub fn key_path(&self, path: &str) -> Result<KeyPath, KeyPathError> {
        KeyPath::parse(path, &self.current_settings.key_separator)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::record;

    fn dictionary() -> Translations {
        Translations::new()
            .with("sv", record! { "menu" => record! { "open" => "Öppna", "close" => "Stäng" } })
            .with("sv-FI", record! { "menu" => record! { "close" => "Sulje" } })
    }

    fn base() -> Value {
        record! { "menu" => record! { "open" => "Open", "close" => "Close", "quit" => "Quit" } }
    }

    fn text(manager: &ConfigManager, view: &MergedView, path: &str) -> Option<String> {
        view.lookup(&manager.key_path(path).unwrap()).map(|resolved| resolved.to_string())
    }

    /// new: デフォルト値で作成される
    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert_eq!(manager.get_settings().key_separator, ".");
        assert!(manager.config_root().is_none());
    }

    /// load_settings: config_root が None の場合
    #[rstest]
    fn test_load_settings_without_root() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings(), &T9nSettings::default());
        assert!(manager.config_root().is_none());
    }

    /// load_settings: 設定ファイルがある場合
    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"keySeparator": "/", "language": "sv-fi"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().key_separator, "/");
        assert!(manager.config_root().is_some());
    }

    /// load_settings: 設定ファイルがない場合はデフォルト値
    #[rstest]
    fn test_load_settings_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().key_separator, ".");
    }

    /// load_settings: 無効な設定ファイルはエラーで、現在の設定は変わらない
    #[rstest]
    fn test_load_settings_invalid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"keySeparator": ""}"#)
            .unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert!(manager.config_root().is_none());
    }

    /// load_settings: JSON パースエラー
    #[rstest]
    fn test_load_settings_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "invalid json").unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    /// read_settings_file: 言語リストを読み込む
    #[googletest::test]
    fn test_read_settings_file_with_languages() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"keySeparator": "/", "languages": ["sv", "sv-SE"]}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let settings = read_settings_file(temp_dir.path()).unwrap().unwrap();

        expect_that!(settings.key_separator, eq("/"));
        expect_that!(settings.languages, some(elements_are![eq("sv"), eq("sv-SE")]));
    }

    /// read_settings_file: ディレクトリ自体がない場合も設定なし
    #[googletest::test]
    fn test_read_settings_file_missing_dir() {
        let temp_dir = TempDir::new().unwrap();

        let result = read_settings_file(&temp_dir.path().join("missing"));

        expect_that!(result.unwrap(), none());
    }

    /// update_settings: 有効な設定で更新成功
    #[rstest]
    fn test_update_settings_valid() {
        let mut manager = ConfigManager::new();
        let new_settings = T9nSettings { key_separator: "/".to_string(), ..T9nSettings::default() };

        let result = manager.update_settings(new_settings);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().key_separator, "/");
    }

    /// update_settings: 無効な設定でエラー
    #[rstest]
    fn test_update_settings_invalid() {
        let mut manager = ConfigManager::new();
        let new_settings = T9nSettings { key_separator: String::new(), ..T9nSettings::default() };

        let result = manager.update_settings(new_settings);

        assert!(result.is_err());
        assert_eq!(manager.get_settings().key_separator, ".");
    }

    /// translate: 単一の言語タグは言語と地域に展開される
    #[googletest::test]
    fn test_translate_with_language() {
        let mut manager = ConfigManager::new();
        manager
            .update_settings(T9nSettings {
                key_separator: "/".to_string(),
                language: Some("sv-fi".to_string()),
                ..T9nSettings::default()
            })
            .unwrap();

        let view = manager.translate(base(), &dictionary());

        expect_that!(text(&manager, &view, "menu/open"), some(eq("Öppna")));
        expect_that!(text(&manager, &view, "menu/close"), some(eq("Sulje")));
        expect_that!(text(&manager, &view, "menu/quit"), some(eq("Quit")));
    }

    /// translate: 言語リストはその順に重ねられる
    #[googletest::test]
    fn test_translate_with_languages() {
        let mut manager = ConfigManager::new();
        manager
            .update_settings(T9nSettings {
                languages: Some(vec!["sv-FI".to_string(), "sv".to_string()]),
                ..T9nSettings::default()
            })
            .unwrap();

        let view = manager.translate(base(), &dictionary());

        expect_that!(text(&manager, &view, "menu.close"), some(eq("Stäng")));
    }

    /// translate: 言語が未設定の場合は base のまま
    #[googletest::test]
    fn test_translate_without_language() {
        let manager = ConfigManager::new();

        let view = manager.translate(base(), &dictionary());

        expect_that!(view.candidates().len(), eq(1));
        expect_that!(text(&manager, &view, "menu.open"), some(eq("Open")));
    }

    /// key_path: 設定された区切り文字が使われる
    #[googletest::test]
    fn test_key_path_uses_configured_separator() {
        let mut manager = ConfigManager::new();
        manager
            .update_settings(T9nSettings { key_separator: "::".to_string(), ..T9nSettings::default() })
            .unwrap();

        let path = manager.key_path("menu::items[1]").unwrap();

        expect_that!(path.to_string_with("::"), eq("menu::items[1]"));
        expect_that!(manager.key_path("menu::::open"), err(anything()));
    }
}
