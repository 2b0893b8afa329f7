//! 运行配置
//!
//! 加载顺序（后者覆盖前者）：
//! 1. 内置默认值；
//! 2. `evently.json` 与 `evently.{environment}.json`；
//! 3. 每个模块的 `modules.{module}.json` 与 `modules.{module}.{environment}.json`，
//!    合并到 `modules.{module}` 节点下；
//! 4. 环境变量 `EVENTLY_LOG`、`EVENTLY_BROKER_QUEUE_CAPACITY`。
//!
//! 文件缺失时跳过，内容非法时报错。
//!
use crate::error::AppError;
use crate::retry::RetryPolicy;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const ENV_LOG: &str = "EVENTLY_LOG";
pub const ENV_BROKER_QUEUE_CAPACITY: &str = "EVENTLY_BROKER_QUEUE_CAPACITY";

/// 代理配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// 待投递消息队列容量，满时 `publish` 等待
    pub queue_capacity: usize,
    /// 同一消息并发投递给多个消费者的上限
    pub consumer_concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            consumer_concurrency: 8,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventlyConfig {
    /// `tracing_subscriber::EnvFilter` 语法
    pub log_filter: String,
    pub broker: BrokerConfig,
    /// 各模块的原始配置节点
    pub modules: BTreeMap<String, Value>,
}

impl Default for EventlyConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            broker: BrokerConfig::default(),
            modules: BTreeMap::new(),
        }
    }
}

impl EventlyConfig {
    /// 读取模块配置节点，缺失时使用默认值
    pub fn module<T>(&self, name: &str) -> Result<T, AppError>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AppError::Config(format!("module {name}: {e}"))),
            None => Ok(T::default()),
        }
    }
}

/// 配置加载器
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dir: PathBuf,
    environment: Option<String>,
    modules: Vec<String>,
}

impl ConfigLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            environment: None,
            modules: Vec::new(),
        }
    }

    /// 叠加 `*.{environment}.json`（如 `Development`）
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.extend(modules.into_iter().map(Into::into));
        self
    }

    /// 从文件与进程环境变量加载
    pub fn load(&self) -> Result<EventlyConfig, AppError> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// 从文件与给定的环境变量来源加载
    pub fn load_with_env<F>(&self, env: F) -> Result<EventlyConfig, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut root = Value::Object(Map::new());

        for path in self.layered("evently") {
            if let Some(layer) = read_json(&path)? {
                merge(&mut root, layer);
            }
        }

        for module in &self.modules {
            for path in self.layered(&format!("modules.{module}")) {
                if let Some(layer) = read_json(&path)? {
                    let mut wrapped = Map::new();
                    let mut section = Map::new();
                    section.insert(module.clone(), layer);
                    wrapped.insert("modules".to_string(), Value::Object(section));
                    merge(&mut root, Value::Object(wrapped));
                }
            }
        }

        let mut config: EventlyConfig = serde_json::from_value(root)
            .map_err(|e| AppError::Config(format!("invalid configuration: {e}")))?;

        if let Some(filter) = env(ENV_LOG) {
            config.log_filter = filter;
        }
        if let Some(raw) = env(ENV_BROKER_QUEUE_CAPACITY) {
            config.broker.queue_capacity = raw.trim().parse().map_err(|e| {
                AppError::Config(format!("{ENV_BROKER_QUEUE_CAPACITY}={raw:?}: {e}"))
            })?;
        }

        if config.broker.queue_capacity == 0 {
            return Err(AppError::Config("broker.queue_capacity must be > 0".into()));
        }
        if config.broker.consumer_concurrency == 0 {
            return Err(AppError::Config(
                "broker.consumer_concurrency must be > 0".into(),
            ));
        }

        Ok(config)
    }

    fn layered(&self, stem: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.dir.join(format!("{stem}.json"))];
        if let Some(env) = &self.environment {
            paths.push(self.dir.join(format!("{stem}.{env}.json")));
        }
        paths
    }
}

fn read_json(path: &Path) -> Result<Option<Value>, AppError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, skipped");
            return Ok(None);
        }
        Err(e) => return Err(AppError::Config(format!("{}: {e}", path.display()))),
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
}

/// 深度合并：对象逐键合并，其他值整体覆盖
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("evently-config-{name}-{}", uuid::Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct TicketingSettings {
        cart_limit: u32,
        currency: String,
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = scratch_dir("defaults");
        let config = ConfigLoader::new(&dir)
            .environment("Development")
            .modules(["users"])
            .load_with_env(no_env)
            .unwrap();
        assert_eq!(config, EventlyConfig::default());
    }

    #[test]
    fn overlays_and_env_take_precedence() {
        let dir = scratch_dir("layers");
        fs::write(
            dir.join("evently.json"),
            r#"{ "log_filter": "warn", "broker": { "queue_capacity": 16, "retry": { "max_retries": 5 } } }"#,
        )
        .unwrap();
        fs::write(
            dir.join("evently.Development.json"),
            r#"{ "broker": { "consumer_concurrency": 2 } }"#,
        )
        .unwrap();
        fs::write(
            dir.join("modules.ticketing.json"),
            r#"{ "cart_limit": 10, "currency": "USD" }"#,
        )
        .unwrap();
        fs::write(
            dir.join("modules.ticketing.Development.json"),
            r#"{ "cart_limit": 3 }"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = HashMap::from([(ENV_LOG, "debug,evently=trace")]);
        let config = ConfigLoader::new(&dir)
            .environment("Development")
            .modules(["ticketing"])
            .load_with_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.log_filter, "debug,evently=trace");
        assert_eq!(config.broker.queue_capacity, 16);
        assert_eq!(config.broker.consumer_concurrency, 2);
        assert_eq!(config.broker.retry.max_retries, 5);
        assert_eq!(config.broker.retry.initial_delay_ms, 100);

        let ticketing: TicketingSettings = config.module("ticketing").unwrap();
        assert_eq!(
            ticketing,
            TicketingSettings {
                cart_limit: 3,
                currency: "USD".into()
            }
        );
        let users: TicketingSettings = config.module("users").unwrap();
        assert_eq!(users, TicketingSettings::default());
    }

    #[test]
    fn malformed_file_and_bad_env_are_errors() {
        let dir = scratch_dir("malformed");
        fs::write(dir.join("evently.json"), "{ not json").unwrap();
        let err = ConfigLoader::new(&dir).load_with_env(no_env).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let dir = scratch_dir("bad-env");
        let err = ConfigLoader::new(&dir)
            .load_with_env(|k| (k == ENV_BROKER_QUEUE_CAPACITY).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_BROKER_QUEUE_CAPACITY));
    }
}
