// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求模块
//!
//! 路由核心只把请求视为一个不可变的值对象：方法、路径、标头、消息体，
//! 以及在匹配成功后附加上的命名属性（路径参数）。
//! 该模块涵盖：
//! 1. 从原始字节解析请求行与标头（供命令行入口和测试使用）。
//! 2. "with-X" 风格的写时复制操作：每次修改都产生一个新值。
//! 3. 命名属性的读取，供中间件与处理器读取路径参数。

use crate::{exception::Exception, header::HeaderMap, param::*, stream::Stream};
use log::error;

/// 表示一个完整的 HTTP 请求。
#[derive(Debug, Clone)]
pub struct Request {
    /// 请求 ID，用于在日志中追踪
    id: u128,
    /// 规范化为大写的请求方法，未知方法也原样保留，由分发器决定如何处理
    method: String,
    /// 请求路径（不含查询字符串）
    path: String,
    /// 查询字符串（`?` 之后的部分）
    query: Option<String>,
    /// HTTP 协议版本
    version: HttpVersion,
    headers: HeaderMap,
    body: Stream,
    /// 命名属性，保持写入顺序
    attributes: Vec<(String, String)>,
}

impl Request {
    /// 以方法和请求目标（可带查询字符串）构造请求。
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            id: 0,
            method: method.to_uppercase(),
            path,
            query,
            version: HttpVersion::V1_1,
            headers: HeaderMap::new(),
            body: Stream::new(),
            attributes: Vec::new(),
        }
    }

    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 以空行切分报文头与消息体。
    /// 2. 验证编码：确保报文头是合法的 UTF-8 字符串。
    /// 3. 解析请求行：提取方法、路径和协议版本。
    /// 4. 逐行解析标头，剩余字节作为消息体。
    ///
    /// 方法名不在这里校验：未知方法交给分发器，以便返回带可用方法列表的 405。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        let separator = CRLF.repeat(2);
        let (head, body) = match find_subslice(buffer, separator.as_bytes()) {
            Some(index) => (&buffer[..index], &buffer[index + separator.len()..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        let head = match std::str::from_utf8(head) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let request_lines: Vec<&str> = head.split(CRLF).collect();

        // 请求行 (e.g., "GET /index.html HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(' ').collect();
        if first_line_parts.len() < 3 || first_line_parts[0].is_empty() {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::MalformedRequestLine);
        }

        let method = first_line_parts[0].to_uppercase();

        let version_str = first_line_parts[first_line_parts.len() - 1].to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/1.0" => HttpVersion::V1_0,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 路径中可能包含空格，虽然不规范但通过 join 尝试恢复
        let target = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };
        let (path, query) = split_target(&target);

        let mut headers = HeaderMap::new();
        for line in request_lines.iter().skip(1) {
            if let Some((name, value)) = line.split_once(':') {
                headers.append(name.trim(), value.trim());
            }
        }

        Ok(Self {
            id,
            method,
            path,
            query,
            version,
            headers,
            body: Stream::from_bytes(body),
            attributes: Vec::new(),
        })
    }
}

// --- 写时复制操作 ---

impl Request {
    pub fn with_id(mut self, id: u128) -> Self {
        self.id = id;
        self
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_uppercase();
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// 设置标头，替换已有取值
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

    /// 设置命名属性，同名属性被覆盖但保留原位置
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
        self
    }

    pub fn without_attribute(mut self, name: &str) -> Self {
        self.attributes.retain(|(key, _)| key != name);
        self
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn id(&self) -> u128 {
        self.id
    }

    /// 获取 HTTP 协议版本
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// 获取请求路径（不含查询参数）
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// 获取请求方法（大写）
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 以 `, ` 连接的标头取值
    pub fn header_line(&self, name: &str) -> String {
        self.headers.get_line(name)
    }

    pub fn body(&self) -> &Stream {
        &self.body
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// 读取路径参数，等价于 `attribute`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attribute(key)
    }

    /// 解析 `Accept-Encoding` 标头，只要包含关键词即视为支持
    pub fn accept_encoding(&self) -> Vec<HttpEncoding> {
        let line = self.headers.get_line("Accept-Encoding");
        let mut accept_encoding = vec![];
        if line.contains("gzip") {
            accept_encoding.push(HttpEncoding::Gzip);
        }
        if line.contains("deflate") {
            accept_encoding.push(HttpEncoding::Deflate);
        }
        if line.contains("br") {
            accept_encoding.push(HttpEncoding::Br);
        }
        accept_encoding
    }
}

fn split_target(target: &str) -> (String, Option<String>) {
    match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
