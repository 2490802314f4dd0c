use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::cache::DEFAULT_PATTERN_CACHE_SIZE;
use crate::compression::DEFAULT_MIN_SIZE;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    route_cache_file: Option<String>,
    #[serde(default = "default_pattern_cache_size")]
    pattern_cache_size: usize,
    #[serde(default)]
    validate_before_dispatch: bool,
    #[serde(default = "default_resource_excluded_methods")]
    resource_excluded_methods: Vec<String>,
    #[serde(default)]
    compression: bool,
    #[serde(default = "default_compression_min_size")]
    compression_min_size: usize,
}

fn default_pattern_cache_size() -> usize {
    DEFAULT_PATTERN_CACHE_SIZE
}

fn default_resource_excluded_methods() -> Vec<String> {
    vec!["OPTIONS".to_string(), "HEAD".to_string()]
}

fn default_compression_min_size() -> usize {
    DEFAULT_MIN_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            route_cache_file: None,
            pattern_cache_size: default_pattern_cache_size(),
            validate_before_dispatch: false,
            resource_excluded_methods: default_resource_excluded_methods(),
            compression: false,
            compression_min_size: default_compression_min_size(),
        }
    }

    pub fn parse(str_val: &str) -> Self {
        let mut raw_config: Config = match toml::from_str(str_val) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        if raw_config.pattern_cache_size == 0 {
            warn!("pattern_cache_size被设置为0，但不支持禁用模式缓存，因此该值将被改为{}。", DEFAULT_PATTERN_CACHE_SIZE);
            raw_config.pattern_cache_size = DEFAULT_PATTERN_CACHE_SIZE;
        }
        raw_config
    }

    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                error!("无法打开配置文件{}：{}，使用默认配置", filename, e);
                return Config::new();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("读取配置文件{}失败：{}，使用默认配置", filename, e);
            return Config::new();
        }
        Self::parse(&str_val)
    }
}

impl Config {
    pub fn route_cache_file(&self) -> Option<&str> {
        self.route_cache_file.as_deref()
    }

    pub fn pattern_cache_size(&self) -> usize {
        self.pattern_cache_size
    }

    pub fn validate_before_dispatch(&self) -> bool {
        self.validate_before_dispatch
    }

    pub fn resource_excluded_methods(&self) -> Vec<&str> {
        self.resource_excluded_methods
            .iter()
            .map(String::as_str)
            .collect()
    }

    pub fn compression(&self) -> bool {
        self.compression
    }

    pub fn compression_min_size(&self) -> usize {
        self.compression_min_size
    }
}

impl Config {
    pub fn with_route_cache_file(mut self, path: &str) -> Self {
        self.route_cache_file = Some(path.to_string());
        self
    }

    pub fn with_validate_before_dispatch(mut self, validate: bool) -> Self {
        self.validate_before_dispatch = validate;
        self
    }

    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }
}
