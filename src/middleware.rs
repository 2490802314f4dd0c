// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 中间件管道模块
//!
//! 管道按添加顺序持有中间件，`build` 把它们组装成一条嵌套的调用链：
//! 第 N 个中间件包裹第 N+1 个，最内层交给终端处理器（分发器）。
//!
//! 每个中间件拿到请求和“链条剩余部分”的借用，可以至多调用一次以继续，
//! 或者直接返回自己的响应以短路。剩余部分只以借用形式出现，中间件无法持有它。
//! 调用链是单线程、同步的。

use std::sync::Arc;

use log::debug;

use crate::{request::Request, response::Response};

/// 接收请求并产生响应的处理器，链条中的每一段都实现它。
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: Request) -> Response;
}

/// 请求处理阶段。
pub trait Middleware: Send + Sync {
    fn process(&self, request: Request, next: &dyn RequestHandler) -> Response;
}

impl<F> Middleware for F
where
    F: Fn(Request, &dyn RequestHandler) -> Response + Send + Sync,
{
    fn process(&self, request: Request, next: &dyn RequestHandler) -> Response {
        self(request, next)
    }
}

/// 包裹一个中间件及其后续链条的处理器
struct Stage {
    middleware: Arc<dyn Middleware>,
    next: Arc<dyn RequestHandler>,
}

impl RequestHandler for Stage {
    fn handle(&self, request: Request) -> Response {
        self.middleware.process(request, self.next.as_ref())
    }
}

/// 以闭包作为终端处理器
pub struct FnHandler<F>(pub F);

impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(Request) -> Response + Send + Sync,
{
    fn handle(&self, request: Request) -> Response {
        (self.0)(request)
    }
}

/// 有序的中间件列表。
#[derive(Default, Clone)]
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加到末尾。已经构建的链条不受影响，需要重新 `build`。
    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    pub fn add_arc(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// 自内向外组装完整的调用链，返回最外层处理器。
    pub fn build(&self, terminal: Arc<dyn RequestHandler>) -> Arc<dyn RequestHandler> {
        debug!("构建中间件调用链，共{}层", self.middleware.len());
        self.middleware
            .iter()
            .rev()
            .fold(terminal, |next, middleware| {
                Arc::new(Stage {
                    middleware: Arc::clone(middleware),
                    next,
                })
            })
    }
}
