// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了路由器在匹配、参数解析与处理器调用过程中可能产生的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了报文解析错误、路由匹配错误、处理器目标缺失以及处理器内部错误。
//! - **统一出口**：所有变体都以普通返回值的形式向上传递，最终只在 `translator` 中被转化为 HTTP 响应。
//! - **用户友好**：通过实现 `std::fmt::Display`，确保错误信息可以被安全地记录到日志或返回给客户端。

use std::fmt;

use serde_derive::{Deserialize, Serialize};

/// 注册时发现的缺失处理器目标：(控制器名称, 方法名)。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTarget {
    /// 控制器（处理器所有者）的名称
    pub owner: String,
    /// 在控制器上找不到的方法名
    pub method: String,
}

impl MissingTarget {
    pub fn new(owner: &str, method: &str) -> Self {
        Self {
            owner: owner.to_string(),
            method: method.to_string(),
        }
    }
}

impl fmt::Display for MissingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.method)
    }
}

/// 路由器处理请求过程中发生的异常类型。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，用于指示处理失败的具体原因。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行不符合 `METHOD PATH VERSION` 的格式。
    MalformedRequestLine,
    /// 客户端使用了不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 该请求方法下没有任何已注册的路由。`available` 为至少注册了一条路由的方法。
    MethodNotAllowed { available: Vec<String> },
    /// 请求方法已知，但没有任何路由与请求路径匹配。
    RouteNotFound { path: String },
    /// 注册时发现的处理器目标缺失，检查路由表时一次性汇总报告。
    TargetNotFound { missing: Vec<MissingTarget> },
    /// 处理器声明的参数既不是请求、响应，也不在路径参数中且没有默认值。
    UnresolvableParameter { name: String },
    /// 其余一切失败，包括处理器自身返回的应用错误。
    Internal { cause: String },
}

impl Exception {
    /// 以任意可显示的错误构造 `Internal`。
    pub fn internal(cause: impl fmt::Display) -> Self {
        Exception::Internal {
            cause: cause.to_string(),
        }
    }
}

use Exception::*;

/// 为 `Exception` 实现 `Display` 特性，使其支持字符串格式化输出。
impl fmt::Display for Exception {
    /// 根据错误类型写入人类可读的描述文本。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            MalformedRequestLine => write!(f, "Malformed request line"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            MethodNotAllowed { available } => {
                if available.is_empty() {
                    write!(f, "Method not allowed")
                } else {
                    write!(
                        f,
                        "Method not allowed. Available methods: {}",
                        available.join(", ")
                    )
                }
            }
            RouteNotFound { .. } => write!(f, "Route not found"),
            TargetNotFound { missing } => {
                if missing.is_empty() {
                    write!(f, "Target not found")
                } else {
                    write!(f, "Missing Target Methods")
                }
            }
            UnresolvableParameter { name } => write!(f, "Unable to resolve parameter: {}", name),
            Internal { cause } => write!(f, "{}", cause),
        }
    }
}

impl std::error::Error for Exception {}
