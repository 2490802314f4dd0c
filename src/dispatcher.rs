// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 分发器模块
//!
//! 分发器把请求与路由表匹配，解析处理器实参并调用处理器。
//!
//! 单个请求的状态流转：
//! `Received → Matching → (Matched → Resolving → Invoking → Responded) | (Unmatched → Error)`，
//! `Resolving` 与 `Invoking` 中的失败同样进入 `Error`。`Error` 是终态，总会产生一个响应：
//! 所有失败（包括处理器 panic）都在 `dispatch` 这一处被拦截并交给错误翻译器。

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use log::{debug, warn};

use crate::{
    exception::{Exception, MissingTarget},
    middleware::RequestHandler,
    param::HttpRequestMethod,
    pattern::ParameterMap,
    request::Request,
    resolver,
    response::Response,
    route::{Route, Target},
    table::RouteTable,
    translator::ErrorTranslator,
};

pub struct Dispatcher {
    table: Arc<RwLock<RouteTable>>,
    translator: ErrorTranslator,
    validate_before_dispatch: bool,
}

impl Dispatcher {
    pub fn new(table: Arc<RwLock<RouteTable>>) -> Self {
        Self {
            table,
            translator: ErrorTranslator::new(),
            validate_before_dispatch: false,
        }
    }

    /// 以独占的路由表构造
    pub fn from_table(table: RouteTable) -> Self {
        Self::new(Arc::new(RwLock::new(table)))
    }

    /// 为 `true` 时每次分发前先检查路由表中的缺失目标
    pub fn validate_before_dispatch(mut self, validate: bool) -> Self {
        self.validate_before_dispatch = validate;
        self
    }

    /// 按注册顺序查找第一条命中的路由。
    ///
    /// 方法未注册任何路由时返回 `MethodNotAllowed`，路径无一命中时返回 `RouteNotFound`。
    pub fn find(&self, method: &str, path: &str) -> Result<(Route, ParameterMap), Exception> {
        let table = self.read_table();
        let routes = method
            .parse::<HttpRequestMethod>()
            .ok()
            .and_then(|method| table.lookup(method));
        let routes = match routes {
            Some(routes) => routes,
            None => {
                return Err(Exception::MethodNotAllowed {
                    available: table
                        .methods()
                        .iter()
                        .map(|m| m.as_str().to_string())
                        .collect(),
                });
            }
        };

        for route in routes {
            if let Some(params) = route.matches(path)? {
                return Ok((route.clone(), params));
            }
        }

        Err(Exception::RouteNotFound {
            path: path.to_string(),
        })
    }

    /// 分发请求。所有失败都被转化为响应，不会向调用方传播。
    pub fn dispatch(&self, request: Request) -> Response {
        let id = request.id();
        match self.try_dispatch(request) {
            Ok(response) => response,
            Err(failure) => self.translator.translate(&failure, id),
        }
    }

    fn try_dispatch(&self, request: Request) -> Result<Response, Exception> {
        let id = request.id();
        if self.validate_before_dispatch {
            let missing = self.read_table().flush_missing();
            if !missing.is_empty() {
                return Err(Exception::TargetNotFound { missing });
            }
        }

        debug!("[ID{}]匹配路由 {} {}", id, request.method(), request.path());
        let (route, params) = self.find(request.method(), request.path())?;
        debug!(
            "[ID{}]命中路由 {} {}，参数{:?}",
            id,
            route.method(),
            route.template(),
            params
        );

        // 路径参数作为命名属性暴露给处理器
        let request = params
            .iter()
            .fold(request, |request, (name, value)| request.with_attribute(name, value));

        let target = route.target();
        let signature = match target.signature() {
            Some(signature) => signature,
            None => return Err(missing_target(target)),
        };
        let args = resolver::resolve(&signature, &params, &request)?;

        match panic::catch_unwind(AssertUnwindSafe(|| target.invoke(args))) {
            Ok(Ok(response)) => Ok(response),
            // 处理器返回的任何错误都是应用错误，不能借用路由层的状态码
            Ok(Err(failure @ Exception::Internal { .. })) => Err(failure),
            Ok(Err(failure)) => Err(Exception::internal(failure)),
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                warn!("[ID{}]处理器发生panic: {}", id, cause);
                Err(Exception::Internal { cause })
            }
        }
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

}

impl RequestHandler for Dispatcher {
    fn handle(&self, request: Request) -> Response {
        self.dispatch(request)
    }
}

fn missing_target(target: &Target) -> Exception {
    let missing = match target {
        Target::Controller { controller, method } => {
            vec![MissingTarget::new(&controller.name(), method)]
        }
        Target::Closure { .. } => vec![],
    };
    Exception::TargetNotFound { missing }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
