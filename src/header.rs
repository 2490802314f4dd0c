// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 大小写不敏感、单个字段可携带多个值的 HTTP 标头容器。
//!
//! 字段名保留第一次写入时的原始大小写，用于输出；查找时忽略大小写。

/// HTTP 标头映射，保持字段的插入顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// 是否存在该字段
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// 获取字段的全部取值，不存在时返回空切片
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(index) => &self.entries[index].1,
            None => &[],
        }
    }

    /// 以 `, ` 连接字段的全部取值
    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// 设置字段，替换已有的全部取值
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(index) => self.entries[index].1 = vec![value.to_string()],
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    /// 追加一个取值，字段不存在时新建
    pub fn append(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(index) => self.entries[index].1.push(value.to_string()),
            None => self
                .entries
                .push((name.to_string(), vec![value.to_string()])),
        }
    }

    pub fn remove(&mut self, name: &str) {
        if let Some(index) = self.position(name) {
            self.entries.remove(index);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按插入顺序遍历 (字段名, 取值列表)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}
