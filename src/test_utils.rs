//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use crate::input::translation::Translations;
use crate::merge::Resolved;
use crate::value::Value;

/// 解決結果を表示用の文字列にする
///
/// 存在しないキーは `None` のまま
pub(crate) fn text(resolved: Option<Resolved>) -> Option<String> {
    resolved.map(|resolved| resolved.to_string())
}

/// テスト用の Value を JSON 文字列から作成する
///
/// # Panics
/// JSON として不正な場合
#[allow(clippy::unwrap_used)]
pub(crate) fn value_from_json(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

/// テスト用の Translations を JSON 文字列から作成する
///
/// # Arguments
/// * `json` - 言語タグをキーとする翻訳のオブジェクト（例: `{"sv": {...}}`）
///
/// # Panics
/// JSON として不正な場合
#[allow(clippy::unwrap_used)]
pub(crate) fn translations_from_json(json: &str) -> Translations {
    serde_json::from_str(json).unwrap()
}
