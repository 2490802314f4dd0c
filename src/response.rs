// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应模块
//!
//! 响应同样是值对象：所有修改都通过消耗 `self` 的 `with_*` 方法完成并返回新值，
//! 在中间件之间传递时不会产生共享可变状态。`as_bytes` 负责把响应写成 HTTP/1.1 报文。

use crate::{exception::Exception, header::HeaderMap, param::*, stream::Stream};

use bytes::Bytes;
use chrono::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    reason: String,
    headers: HeaderMap,
    body: Stream,
    date: DateTime<Utc>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            reason: "OK".to_string(),
            headers: HeaderMap::new(),
            body: Stream::new(),
            date: Utc::now(),
        }
    }

    /// 以状态码构造空响应
    pub fn from_status_code(code: u16) -> Self {
        Self::new().with_status(code)
    }

    /// 设置状态码，原因短语取标准值
    pub fn with_status(self, code: u16) -> Self {
        self.with_status_reason(code, reason_phrase(code))
    }

    pub fn with_status_reason(mut self, code: u16, reason: &str) -> Self {
        self.status_code = code;
        self.reason = reason.to_string();
        self
    }

    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_added_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    pub fn with_body(mut self, body: impl Into<Stream>) -> Self {
        self.body = body.into();
        self
    }

    /// 以 JSON 序列化 `data` 作为消息体，并设置 `Content-Type`
    pub fn json<T: Serialize + ?Sized>(self, data: &T) -> Result<Self, Exception> {
        let content = serde_json::to_vec(data).map_err(Exception::internal)?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body(Stream::from_bytes(content)))
    }

    /// 纯文本消息体
    pub fn text(self, content: &str) -> Self {
        self.with_header("Content-Type", "text/plain;charset=utf-8")
            .with_body(content)
    }

    /// 序列化为完整的 HTTP 报文。
    ///
    /// `Content-Length`、`Date` 与 `Server` 由这里统一生成，覆盖同名的自定义标头。
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "{} {} {}{}",
            self.version, self.status_code, self.reason, CRLF
        );
        for (name, values) in self.headers.iter() {
            if is_generated_header(name) {
                continue;
            }
            for value in values {
                header.push_str(&[name, ": ", value, CRLF].concat());
            }
        }
        header.push_str(&["Content-Length: ", &self.body.len().to_string(), CRLF].concat());
        header.push_str(&["Date: ", &format_date(&self.date), CRLF].concat());
        header.push_str(&["Server: ", SERVER_NAME, CRLF].concat());
        header.push_str(CRLF);

        [header.as_bytes(), self.body.as_slice()].concat()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header_line(&self, name: &str) -> String {
        self.headers.get_line(name)
    }

    pub fn body(&self) -> &Stream {
        &self.body
    }

    pub fn content(&self) -> Bytes {
        self.body.contents()
    }
}

fn is_generated_header(name: &str) -> bool {
    ["Content-Length", "Date", "Server"]
        .iter()
        .any(|generated| generated.eq_ignore_ascii_case(name))
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}
