// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 错误翻译模块
//!
//! 路由层失败到 HTTP 状态码的映射只在这里决定：
//!
//! | 失败                                         | 状态码 |
//! |----------------------------------------------|--------|
//! | `MethodNotAllowed`                           | 405    |
//! | `RouteNotFound`                              | 404    |
//! | `UnresolvableParameter` / `TargetNotFound`   | 404    |
//! | `RequestIsNotUtf8` / `MalformedRequestLine`  | 400    |
//! | `UnsupportedHttpVersion`                     | 505    |
//! | 其余                                         | 500    |
//!
//! 响应体是一个最小的 JSON 诊断对象，包含状态码、原因短语、失败信息以及各失败特有的细节。

use log::{error, warn};
use serde_json::{json, Value};

use crate::{exception::Exception, param::reason_phrase, response::Response};

#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    pub fn new() -> Self {
        ErrorTranslator
    }

    pub fn status_code(failure: &Exception) -> u16 {
        match failure {
            Exception::MethodNotAllowed { .. } => 405,
            Exception::RouteNotFound { .. } => 404,
            Exception::TargetNotFound { .. } | Exception::UnresolvableParameter { .. } => 404,
            Exception::RequestIsNotUtf8 | Exception::MalformedRequestLine => 400,
            Exception::UnsupportedHttpVersion => 505,
            Exception::Internal { .. } => 500,
        }
    }

    /// 把失败转化为完整的响应，从不失败。
    pub fn translate(&self, failure: &Exception, id: u128) -> Response {
        let code = Self::status_code(failure);
        if code >= 500 {
            error!("[ID{}]请求处理失败({}): {}", id, code, failure);
        } else {
            warn!("[ID{}]请求处理失败({}): {}", id, code, failure);
        }

        let mut body = json!({
            "status": code,
            "error": reason_phrase(code),
            "message": failure.to_string(),
        });
        let detail = match failure {
            Exception::MethodNotAllowed { available } => Some(("available", json!(available))),
            Exception::RouteNotFound { path } => Some(("path", json!(path))),
            Exception::TargetNotFound { missing } => Some(("missing", json!(missing))),
            Exception::UnresolvableParameter { name } => Some(("parameter", json!(name))),
            _ => None,
        };
        if let (Some((key, value)), Value::Object(map)) = (detail, &mut body) {
            map.insert(key.to_string(), value);
        }

        let mut response = Response::from_status_code(code);
        if let Exception::MethodNotAllowed { available } = failure {
            if !available.is_empty() {
                response = response.with_header("Allow", &available.join(", "));
            }
        }
        match response.clone().json(&body) {
            Ok(response) => response,
            Err(_) => response.text(&failure.to_string()),
        }
    }
}
