// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 响应压缩中间件。
//!
//! 根据请求的 `Accept-Encoding` 选择编码（gzip 优先，其次 deflate，最后 br），
//! 跳过已经压缩过的媒体类型、过小的响应体和已设置 `Content-Encoding` 的响应。

use std::io::{self, Write};

use brotli::enc::{self, backward_references::BrotliEncoderParams};
use flate2::{
    write::{DeflateEncoder, GzEncoder},
    Compression as Level,
};
use log::{debug, error};

use crate::{
    middleware::{Middleware, RequestHandler},
    param::HttpEncoding,
    request::Request,
    response::Response,
    stream::Stream,
};

pub const DEFAULT_MIN_SIZE: usize = 256;

pub struct Compression {
    min_size: usize,
}

impl Default for Compression {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SIZE)
    }
}

impl Compression {
    pub fn new(min_size: usize) -> Self {
        Self { min_size }
    }
}

impl Middleware for Compression {
    fn process(&self, request: Request, next: &dyn RequestHandler) -> Response {
        let id = request.id();
        let accept_encoding = request.accept_encoding();
        let response = next.handle(request);

        if response.headers().contains("Content-Encoding") || response.body().len() < self.min_size
        {
            return response;
        }
        let content_type = response.header_line("Content-Type");
        if should_skip_compression(&content_type) {
            debug!("[ID{}]文件类型: {}, 跳过压缩", id, content_type);
            return response;
        }
        let encoding = match decide_encoding(&accept_encoding) {
            Some(encoding) => encoding,
            None => return response,
        };

        match compress(response.body().as_slice().to_vec(), Some(encoding)) {
            Ok(compressed) => response
                .with_header("Content-Encoding", &encoding.to_string())
                .with_added_header("Vary", "Accept-Encoding")
                .with_body(Stream::from_bytes(compressed)),
            Err(e) => {
                error!("[ID{}]压缩响应失败: {}，返回未压缩内容", id, e);
                response
            }
        }
    }
}

fn compress(data: Vec<u8>, mode: Option<HttpEncoding>) -> io::Result<Vec<u8>> {
    let original_size = data.len();
    let result = match mode {
        Some(HttpEncoding::Gzip) => {
            let mut encoder = GzEncoder::new(Vec::new(), Level::default());
            encoder.write_all(&data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Deflate) => {
            let mut encoder = DeflateEncoder::new(Vec::new(), Level::default());
            encoder.write_all(&data)?;
            encoder.finish()
        }
        Some(HttpEncoding::Br) => {
            let params = BrotliEncoderParams::default();
            let mut output = Vec::new();
            enc::BrotliCompress(&mut io::Cursor::new(data), &mut output, &params)?;
            Ok(output)
        }
        None => Ok(data),
    };

    if let Ok(ref compressed) = result {
        let compressed_size = compressed.len();
        let ratio = if original_size > 0 {
            ((original_size as i64 - compressed_size as i64) as f64 / original_size as f64) * 100.0
        } else {
            0.0
        };
        debug!(
            "压缩完成: {:?}, 原始大小: {} bytes, 压缩后: {} bytes, 压缩率: {:.1}%",
            mode, original_size, compressed_size, ratio
        );
    }

    result
}

fn should_skip_compression(mime_type: &str) -> bool {
    let skip_types = [
        "image/",
        "video/",
        "audio/",
        "application/zip",
        "application/x-rar",
        "application/x-7z-compressed",
        "application/gzip",
        "application/x-gzip",
        "font/woff",
        "font/woff2",
    ];

    skip_types
        .iter()
        .any(|&skip_type| mime_type.starts_with(skip_type))
}

fn decide_encoding(accept_encoding: &[HttpEncoding]) -> Option<HttpEncoding> {
    if accept_encoding.contains(&HttpEncoding::Gzip) {
        Some(HttpEncoding::Gzip)
    } else if accept_encoding.contains(&HttpEncoding::Deflate) {
        Some(HttpEncoding::Deflate)
    } else if accept_encoding.contains(&HttpEncoding::Br) {
        Some(HttpEncoding::Br)
    } else {
        None
    }
}
