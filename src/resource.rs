// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 资源路由：把一个 URL 模板按 HTTP 方法展开为多条控制器路由。
//!
//! 每个未被排除的方法注册一条路由，目标方法名为小写的动词（`GET` → `get`）。
//! 默认展开 GET POST PUT PATCH DELETE OPTIONS HEAD，排除 OPTIONS 与 HEAD。

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    param::{
        HttpRequestMethod, API_RESOURCE_EXCLUDED_METHODS, RESOURCE_EXCLUDED_METHODS,
        RESOURCE_METHODS,
    },
    route::{Controller, Target},
    table::RouteTable,
};

#[derive(Clone)]
pub struct RouteResource {
    url: String,
    controller: Arc<dyn Controller>,
    methods: Vec<HttpRequestMethod>,
    excluded: Vec<HttpRequestMethod>,
}

impl RouteResource {
    pub fn new(url: &str, controller: Arc<dyn Controller>) -> Self {
        Self {
            url: url.to_string(),
            controller,
            methods: RESOURCE_METHODS.to_vec(),
            excluded: RESOURCE_EXCLUDED_METHODS.to_vec(),
        }
    }

    /// 替换排除列表，方法名不区分大小写
    pub fn except_methods(mut self, methods: &[&str]) -> Self {
        self.excluded = parse_methods(methods);
        self
    }

    /// 只展开给定的方法，排除列表仍然生效
    pub fn only_methods(mut self, methods: &[&str]) -> Self {
        self.methods = parse_methods(methods);
        self
    }

    /// 给出方法时等同于 `except_methods`，否则排除 GET POST PUT PATCH DELETE
    pub fn api_resource(mut self, methods: &[&str]) -> Self {
        if methods.is_empty() {
            self.excluded = API_RESOURCE_EXCLUDED_METHODS.to_vec();
            self
        } else {
            self.except_methods(methods)
        }
    }

    /// 实际会注册的方法，按展开顺序
    pub fn methods(&self) -> Vec<HttpRequestMethod> {
        self.methods
            .iter()
            .filter(|method| !self.excluded.contains(method))
            .copied()
            .collect()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 把资源展开注册到路由表
    pub fn register(&self, table: &mut RouteTable) {
        for method in self.methods() {
            debug!(
                "资源{}展开为 {} -> {}::{}",
                self.url,
                method,
                self.controller.name(),
                method.handler_name()
            );
            table.register(
                method,
                &self.url,
                Target::controller(Arc::clone(&self.controller), &method.handler_name()),
            );
        }
    }
}

fn parse_methods(methods: &[&str]) -> Vec<HttpRequestMethod> {
    methods
        .iter()
        .filter_map(|name| match name.parse::<HttpRequestMethod>() {
            Ok(method) => Some(method),
            Err(unknown) => {
                warn!("忽略未知的HTTP方法：{}", unknown);
                None
            }
        })
        .collect()
}
