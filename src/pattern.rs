// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路径模板匹配模块
//!
//! 路由模板形如 `/data/{id}/user/{user_id}`。编译时每个占位符被替换为
//! 匹配“一个或多个非 `/` 字符”的捕获组，字面部分按原样（转义后）保留，
//! 整个模式在首尾锚定。
//!
//! 匹配分两步：先做字面相等的快速判断；否则用正则捕获参数，
//! 再把参数代回模板重建路径，只有重建结果与请求路径逐字节相同才算命中。

use lazy_static::lazy_static;
use regex::Regex;

use crate::exception::Exception;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([^}]+)\}").unwrap();
}

/// 一次匹配得到的路径参数，顺序与模板中占位符出现的顺序一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, String)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入参数；同名参数覆盖旧值但保留原位置
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// 从左到右提取模板中的全部占位符名称，不去重。
pub fn extract_names(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// 模板的结构形状：所有占位符替换为 `{}`。形状相同的两个模板在同一方法下互相覆盖。
pub fn shape(template: &str) -> String {
    PLACEHOLDER.replace_all(template, "{}").to_string()
}

/// 依次把每个 `{name}` 替换为参数值。
///
/// 替换按参数顺序逐个进行，前一个参数值中出现的 `{name}` 文本会被后续替换改写。
pub fn reconstruct(template: &str, params: &ParameterMap) -> String {
    let mut path = template.to_string();
    for (name, value) in params.iter() {
        path = path.replace(&format!("{{{}}}", name), value);
    }
    path
}

/// 编译后的路径模板。
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    template: String,
    names: Vec<String>,
    regex: Regex,
}

/// 编译模板：占位符替换为 `([^/]+)`，其余字面部分转义，首尾锚定。
pub fn compile(template: &str) -> Result<CompiledPattern, Exception> {
    let mut pattern = String::from("^");
    let mut last = 0;
    for found in PLACEHOLDER.find_iter(template) {
        pattern.push_str(&regex::escape(&template[last..found.start()]));
        pattern.push_str("([^/]+)");
        last = found.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(Exception::internal)?;
    Ok(CompiledPattern {
        template: template.to_string(),
        names: extract_names(template),
        regex,
    })
}

impl CompiledPattern {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 仅做正则捕获，把名称与捕获值按顺序配对；不匹配时返回 `None`。
    pub fn captures(&self, path: &str) -> Option<ParameterMap> {
        let caps = self.regex.captures(path)?;
        let mut params = ParameterMap::new();
        for (name, value) in self.names.iter().zip(caps.iter().skip(1)) {
            if let Some(value) = value {
                params.insert(name, value.as_str());
            }
        }
        Some(params)
    }

    /// 完整的匹配判定。
    ///
    /// 1. 模板与路径字面相等时直接命中，参数为空。
    /// 2. 否则要求捕获到至少一个参数，且参数代回模板后与路径完全相同。
    pub fn matches(&self, path: &str) -> Option<ParameterMap> {
        if self.template == path {
            return Some(ParameterMap::new());
        }
        let params = self.captures(path)?;
        if params.is_empty() {
            return None;
        }
        if reconstruct(&self.template, &params) == path {
            Some(params)
        } else {
            None
        }
    }
}

/// 不经缓存地编译并匹配一次。
pub fn match_template(template: &str, path: &str) -> Result<Option<ParameterMap>, Exception> {
    Ok(compile(template)?.matches(path))
}
