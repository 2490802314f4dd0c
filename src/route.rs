// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 路由与处理器目标。
//!
//! 处理器目标有两种形式：直接可调用的闭包，或 (控制器, 方法名) 组合。
//! 二者都通过 [`Signature`] 显式描述参数，不依赖运行时反射。

use std::fmt;
use std::sync::Arc;

use serde_derive::{Deserialize, Serialize};

use crate::{
    exception::Exception,
    param::HttpRequestMethod,
    pattern::{self, CompiledPattern, ParameterMap},
    resolver::{Arguments, Signature},
    response::Response,
};

/// 闭包处理器的类型
pub type HandlerFn = dyn Fn(Arguments) -> Result<Response, Exception> + Send + Sync;

/// 以名称暴露一组方法的控制器。
#[cfg_attr(test, mockall::automock)]
pub trait Controller: Send + Sync {
    /// 控制器名称，用于缺失目标的报告与路由快照
    fn name(&self) -> String;

    /// 方法的参数描述；控制器没有该方法时返回 `None`
    fn describe(&self, method: &str) -> Option<Signature>;

    /// 以解析好的实参调用方法
    fn call(&self, method: &str, args: Arguments) -> Result<Response, Exception>;
}

/// 路由命中后调用的处理器目标。
#[derive(Clone)]
pub enum Target {
    Closure {
        signature: Signature,
        func: Arc<HandlerFn>,
    },
    Controller {
        controller: Arc<dyn Controller>,
        method: String,
    },
}

impl Target {
    pub fn closure<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(Arguments) -> Result<Response, Exception> + Send + Sync + 'static,
    {
        Target::Closure {
            signature,
            func: Arc::new(func),
        }
    }

    pub fn controller(controller: Arc<dyn Controller>, method: &str) -> Self {
        Target::Controller {
            controller,
            method: method.to_string(),
        }
    }

    /// 目标的参数描述；控制器方法不存在时为 `None`
    pub fn signature(&self) -> Option<Signature> {
        match self {
            Target::Closure { signature, .. } => Some(signature.clone()),
            Target::Controller { controller, method } => controller.describe(method),
        }
    }

    pub fn invoke(&self, args: Arguments) -> Result<Response, Exception> {
        match self {
            Target::Closure { func, .. } => func(args),
            Target::Controller { controller, method } => controller.call(method, args),
        }
    }

    /// 可序列化的目标描述
    pub fn record(&self) -> HandlerRecord {
        match self {
            Target::Closure { .. } => HandlerRecord::Closure,
            Target::Controller { controller, method } => HandlerRecord::Controller {
                owner: controller.name(),
                method: method.clone(),
            },
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Closure { signature, .. } => f
                .debug_struct("Closure")
                .field("signature", signature)
                .finish(),
            Target::Controller { controller, method } => f
                .debug_struct("Controller")
                .field("owner", &controller.name())
                .field("method", method)
                .finish(),
        }
    }
}

/// 一条已注册的路由。注册后不再修改。
///
/// 模板在构造时编译一次，之后的每次匹配都复用同一个编译结果。
/// 编译失败不会让注册失败，错误保留到匹配时再报告。
#[derive(Debug, Clone)]
pub struct Route {
    method: HttpRequestMethod,
    template: String,
    pattern: Result<Arc<CompiledPattern>, Exception>,
    target: Target,
}

impl Route {
    pub fn new(method: HttpRequestMethod, template: &str, target: Target) -> Self {
        Self::with_pattern(method, template, pattern::compile(template).map(Arc::new), target)
    }

    /// 以已编译（或编译失败）的模板构造，供路由表复用缓存中的编译结果
    pub fn with_pattern(
        method: HttpRequestMethod,
        template: &str,
        pattern: Result<Arc<CompiledPattern>, Exception>,
        target: Target,
    ) -> Self {
        Self {
            method,
            template: template.to_string(),
            pattern,
            target,
        }
    }

    /// 用注册时编译好的模板匹配路径
    pub fn matches(&self, path: &str) -> Result<Option<ParameterMap>, Exception> {
        match &self.pattern {
            Ok(pattern) => Ok(pattern.matches(path)),
            Err(e) => Err(e.clone()),
        }
    }

    pub fn pattern(&self) -> Option<&Arc<CompiledPattern>> {
        self.pattern.as_ref().ok()
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn record(&self) -> RouteRecord {
        RouteRecord {
            method: self.method,
            path: self.template.clone(),
            handler: self.target.record(),
        }
    }
}

/// 处理器目标的可序列化形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HandlerRecord {
    Closure,
    Controller { owner: String, method: String },
}

/// 路由的可序列化形式，用于路由快照与路由表导出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub method: HttpRequestMethod,
    pub path: String,
    pub handler: HandlerRecord,
}
