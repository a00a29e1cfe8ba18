//! 翻訳の解決コストのベンチマーク
//!
//! 使用方法:
//! ```
//! cargo run --release --example bench_resolution -- [groups] [keys] [languages]
//! ```

use t9n::config::{
    ConfigManager,
    T9nSettings,
};
use t9n::{
    Translations,
    Value,
};

fn main() {
    // tracing を初期化（INFO レベル）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<usize> = std::env::args().skip(1).filter_map(|arg| arg.parse().ok()).collect();
    let groups = args.first().copied().unwrap_or(200);
    let keys = args.get(1).copied().unwrap_or(50);
    let languages = args.get(2).copied().unwrap_or(4);

    println!("=== Translation Resolution Benchmark ===");
    println!("Groups: {groups}, keys per group: {keys}, languages: {languages}");
    println!();

    let base = generate_tree(groups, keys, "base", 1);
    let mut translations = Translations::new();
    let mut tags = Vec::new();
    for language in 0..languages {
        let tag = format!("l{language}");
        // 各言語は一部のキーだけを上書きする
        translations.insert(tag.clone(), generate_tree(groups, keys, &tag, language + 2));
        tags.push(tag);
    }

    let mut config_manager = ConfigManager::new();
    if let Err(e) = config_manager
        .update_settings(T9nSettings { languages: Some(tags), ..T9nSettings::default() })
    {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // 複数回実行して平均を取る
    let iterations = 3;
    let mut times = Vec::new();

    for i in 1..=iterations {
        println!("--- Iteration {}/{} ---", i, iterations);
        let elapsed = run_resolution(&config_manager, &base, &translations, groups, keys);
        times.push(elapsed);
        println!();
    }

    println!("=== Results ===");
    for (i, time) in times.iter().enumerate() {
        println!("  Run {}: {}µs", i + 1, time);
    }
    let avg = times.iter().sum::<u128>() / times.len() as u128;
    let min = *times.iter().min().unwrap_or(&0);
    let max = *times.iter().max().unwrap_or(&0);
    println!("  Average: {}µs", avg);
    println!("  Min: {}µs, Max: {}µs", min, max);
}

/// `groups` 個のグループに `keys` 個ずつ文字列を持つツリーを作る
///
/// `stride` 番目ごとのキーだけを定義する（`stride == 1` で全キー）
fn generate_tree(groups: usize, keys: usize, label: &str, stride: usize) -> Value {
    Value::record((0..groups).map(|group| {
        let fields = (0..keys)
            .filter(|key| key % stride == 0)
            .map(|key| (format!("k{key}"), Value::from(format!("{label} {group}.{key}"))));
        (format!("g{group}"), Value::record(fields))
    }))
}

fn run_resolution(
    config_manager: &ConfigManager,
    base: &Value,
    translations: &Translations,
    groups: usize,
    keys: usize,
) -> u128 {
    let start = std::time::Instant::now();

    let view = config_manager.translate(base.clone(), translations);
    let setup = start.elapsed().as_micros();

    // 1 グループだけ読む場合と全体を読む場合
    let single = (0..keys)
        .filter_map(|key| view.get("g0").and_then(|group| group.get(format!("k{key}"))))
        .count();
    let after_single = start.elapsed().as_micros();

    let mut resolved = 0;
    for group in 0..groups {
        let Some(group_view) = view.get(format!("g{group}")) else { continue };
        resolved += (0..keys).filter_map(|key| group_view.get(format!("k{key}"))).count();
    }
    let elapsed = start.elapsed().as_micros();

    println!("  Setup: {setup}µs");
    println!("  Resolved {single} keys of one group in {}µs", after_single - setup);
    println!("  Resolved {resolved} keys of all groups in {}µs", elapsed - after_single);

    elapsed
}
