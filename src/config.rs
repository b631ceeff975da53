//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `AIDE__*` 覆盖（双下划线表示嵌套，如 `AIDE__AUGMENT__ENABLED=false`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub server: ServerSection,
    pub augment: AugmentSection,
    pub classifier: ClassifierSection,
    pub tasks: TasksSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [server] 段：HTTP 监听地址
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// [augment] 段：远端增强服务
#[derive(Debug, Clone, Deserialize)]
pub struct AugmentSection {
    /// 关闭后不探测、不调用，始终走纯本地路径
    #[serde(default = "default_augment_enabled")]
    pub enabled: bool,
    #[serde(default = "default_augment_base_url")]
    pub base_url: String,
    /// 单次能力调用超时（毫秒）
    #[serde(default = "default_augment_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_augment_enabled() -> bool {
    true
}

fn default_augment_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_augment_timeout_ms() -> u64 {
    3000
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

impl Default for AugmentSection {
    fn default() -> Self {
        Self {
            enabled: default_augment_enabled(),
            base_url: default_augment_base_url(),
            timeout_ms: default_augment_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// [classifier] 段
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSection {
    /// 低于该分数归为 None
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_min_score() -> f32 {
    crate::nlp::DEFAULT_MIN_SCORE
}

fn default_max_input_chars() -> usize {
    crate::core::pipeline::DEFAULT_MAX_INPUT_CHARS
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// [tasks] 段
#[derive(Debug, Clone, Deserialize)]
pub struct TasksSection {
    /// 新建任务的默认到期时间（小时后）
    #[serde(default = "default_due_hours")]
    pub default_due_hours: i64,
}

fn default_due_hours() -> i64 {
    24
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            default_due_hours: default_due_hours(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 AIDE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 AIDE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("AIDE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
