// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 请求体与响应体共用的内存流：可读、可写、可定位。

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use bytes::Bytes;

/// 基于内存缓冲区的消息体流。
///
/// 写入发生在当前游标处；`contents` 总是返回完整内容，与游标位置无关。
#[derive(Debug, Clone, Default)]
pub struct Stream {
    inner: Cursor<Vec<u8>>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有内容构造，游标位于开头以便读取
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Cursor::new(data.into()),
        }
    }

    /// 完整内容的只读副本
    pub fn contents(&self) -> Bytes {
        Bytes::copy_from_slice(self.inner.get_ref())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.inner.get_ref()
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    /// 游标当前位置
    pub fn tell(&self) -> u64 {
        self.inner.position()
    }

    pub fn rewind(&mut self) {
        self.inner.set_position(0);
    }

    /// 追加到末尾，不论游标在何处
    pub fn append(&mut self, data: &[u8]) {
        self.inner.get_mut().extend_from_slice(data);
    }

    /// 以 UTF-8（有损）形式返回完整内容
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.inner.get_ref()).to_string()
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.inner.get_ref() == other.inner.get_ref()
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl From<&str> for Stream {
    fn from(value: &str) -> Self {
        Stream::from_bytes(value.as_bytes())
    }
}

impl From<Bytes> for Stream {
    fn from(value: Bytes) -> Self {
        Stream::from_bytes(value.to_vec())
    }
}
