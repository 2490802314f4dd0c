// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由器
//!
//! 路由器是启动代码面对的唯一入口：它持有路由表、中间件管道与配置，
//! 提供注册接口，并把请求交给组装好的调用链（中间件 → 分发器）。
//!
//! 注册属于启动阶段的活动，应在第一次 `handle` 之前完成。
//! 第一次 `handle` 时调用链被构建并缓存；之后再添加中间件会使缓存失效，下一次请求时整体重建。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};

use crate::{
    compression::Compression,
    config::Config,
    dispatcher::Dispatcher,
    exception::Exception,
    middleware::{Middleware, Pipeline, RequestHandler},
    param::HttpRequestMethod,
    request::Request,
    resource::RouteResource,
    response::Response,
    route::{Controller, RouteRecord, Target},
    table::RouteTable,
};

pub struct Router {
    config: Config,
    table: Arc<RwLock<RouteTable>>,
    pipeline: Pipeline,
    chain: Option<Arc<dyn RequestHandler>>,
    next_id: AtomicU64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(Config::new())
    }

    pub fn with_config(config: Config) -> Self {
        let mut router = Self {
            config: config.clone(),
            table: Arc::new(RwLock::new(RouteTable::with_pattern_cache_size(
                config.pattern_cache_size(),
            ))),
            pipeline: Pipeline::new(),
            chain: None,
            next_id: AtomicU64::new(1),
        };
        if let Some(path) = config.route_cache_file() {
            router.enable_cache(path);
        }
        if config.compression() {
            router.add_middleware(Compression::new(config.compression_min_size()));
        }
        router
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- 注册接口 ---

    pub fn route(&mut self, method: HttpRequestMethod, template: &str, target: Target) -> &mut Self {
        self.write_table().register(method, template, target);
        self
    }

    pub fn get(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Get, template, target)
    }

    pub fn post(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Post, template, target)
    }

    pub fn put(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Put, template, target)
    }

    pub fn patch(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Patch, template, target)
    }

    pub fn delete(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Delete, template, target)
    }

    pub fn head(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Head, template, target)
    }

    pub fn options(&mut self, template: &str, target: Target) -> &mut Self {
        self.route(HttpRequestMethod::Options, template, target)
    }

    /// 以配置中的排除列表展开资源路由
    pub fn resource(&mut self, url: &str, controller: Arc<dyn Controller>) -> &mut Self {
        let resource = RouteResource::new(url, controller)
            .except_methods(&self.config.resource_excluded_methods());
        self.register_resource(resource)
    }

    pub fn register_resource(&mut self, resource: RouteResource) -> &mut Self {
        resource.register(&mut self.write_table());
        self
    }

    /// 追加中间件。已构建的调用链会被丢弃并在下一次请求时重建。
    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        if self.chain.take().is_some() {
            warn!("调用链构建后又添加了中间件，调用链将被整体重建");
        }
        self.pipeline.add(middleware);
        self
    }

    // --- 路由快照 ---

    /// 启用路由快照并读取已有内容
    pub fn enable_cache(&mut self, path: &str) -> &mut Self {
        self.write_table().snapshot_mut().enable(path);
        self
    }

    pub fn disable_cache(&mut self) -> &mut Self {
        self.write_table().snapshot_mut().disable();
        self
    }

    pub fn clear_cache(&mut self) -> &mut Self {
        self.write_table().snapshot_mut().clear();
        self
    }

    pub fn cached_routes(&self) -> Vec<RouteRecord> {
        self.read_table().snapshot().cached_routes().to_vec()
    }

    /// 用快照中的记录重建控制器路由
    pub fn restore_routes<F>(&mut self, lookup: F) -> usize
    where
        F: Fn(&str) -> Option<Arc<dyn Controller>>,
    {
        let records = self.cached_routes();
        self.write_table().restore(&records, lookup)
    }

    // --- 检查与分发 ---

    /// 导出路由表；存在缺失的控制器方法时以 `TargetNotFound` 失败
    pub fn check_routes(&self) -> Result<Vec<RouteRecord>, Exception> {
        self.read_table().check_routes()
    }

    pub fn routes(&self) -> RwLockReadGuard<'_, RouteTable> {
        self.read_table()
    }

    /// 构建完整的调用链：中间件按添加顺序包裹分发器
    pub fn build(&mut self) -> Arc<dyn RequestHandler> {
        if let Some(chain) = &self.chain {
            return Arc::clone(chain);
        }
        let dispatcher = Dispatcher::new(Arc::clone(&self.table))
            .validate_before_dispatch(self.config.validate_before_dispatch());
        let chain = self.pipeline.build(Arc::new(dispatcher));
        info!(
            "调用链已构建：{}条路由，{}个中间件",
            self.read_table().len(),
            self.pipeline.len()
        );
        self.chain = Some(Arc::clone(&chain));
        chain
    }

    /// 处理一个请求。没有 ID 的请求会被分配一个。
    pub fn handle(&mut self, request: Request) -> Response {
        let request = if request.id() == 0 {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) as u128;
            request.with_id(id)
        } else {
            request
        };
        debug!(
            "[ID{}]收到请求 {} {}",
            request.id(),
            request.method(),
            request.path()
        );
        let chain = self.build();
        chain.handle(request)
    }

    fn read_table(&self) -> RwLockReadGuard<'_, RouteTable> {
        match self.table.read() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("路由表锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, RouteTable> {
        match self.table.write() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("路由表锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Signature;

    fn echo_id() -> Target {
        Target::closure(Signature::new().response().param("id"), |mut args| {
            let id = args.value("id").unwrap_or_default().to_string();
            Ok(args.take_response().text(&id))
        })
    }

    #[test]
    fn test_handle_assigns_ids() {
        let mut router = Router::new();
        router.add_middleware(|request: Request, next: &dyn RequestHandler| {
            let id = request.id().to_string();
            next.handle(request).with_header("X-Request-Id", &id)
        });
        router.get("/home/{id}", echo_id());

        let first = router.handle(Request::new("GET", "/home/1"));
        let second = router.handle(Request::new("GET", "/home/2"));
        assert_eq!(first.header_line("X-Request-Id"), "1");
        assert_eq!(second.header_line("X-Request-Id"), "2");
        assert_eq!(second.body().to_string_lossy(), "2");
    }

    #[test]
    fn test_routes_registered_after_build_are_visible() {
        let mut router = Router::new();
        router.get("/a/{id}", echo_id());
        router.build();
        router.post("/b/{id}", echo_id());

        let response = router.handle(Request::new("POST", "/b/9"));
        assert_eq!(response.body().to_string_lossy(), "9");
    }

    #[test]
    fn test_middleware_added_after_build_triggers_rebuild() {
        let mut router = Router::new();
        router.get("/a/{id}", echo_id());
        assert_eq!(router.handle(Request::new("GET", "/a/1")).status_code(), 200);

        router.add_middleware(|_request: Request, _next: &dyn RequestHandler| {
            Response::from_status_code(503)
        });
        assert_eq!(router.handle(Request::new("GET", "/a/1")).status_code(), 503);
    }

    #[test]
    fn test_compression_from_config() {
        let mut router = Router::with_config(Config::new().with_compression(true));
        router.get(
            "/big",
            Target::closure(Signature::new(), |_| Ok(Response::new().text(&"x".repeat(1024)))),
        );
        let response = router.handle(Request::new("GET", "/big").with_header("Accept-Encoding", "gzip"));
        assert_eq!(response.header_line("Content-Encoding"), "gzip");
    }
}
