// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由快照模块
//!
//! 快照把路由表的可序列化形式（JSON）保存在单个文件中，供进程重启后复用。
//! 快照只是建议性的缓存：文件损坏或无法读取时退化为空缓存，不影响启动。
//!
//! 启用后每次注册都会同步重写整个文件：先写入同目录下的临时文件，再原子地重命名覆盖。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use tempfile::NamedTempFile;

use crate::{pattern, route::RouteRecord};

#[derive(Debug, Default)]
pub struct RouteSnapshot {
    file: Option<PathBuf>,
    records: Vec<RouteRecord>,
}

impl RouteSnapshot {
    /// 启用快照。文件存在时读取其中的路由记录。
    pub fn enable(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.records = if path.exists() {
            Self::load(&path)
        } else {
            Vec::new()
        };
        info!(
            "路由快照已启用：{}，载入{}条记录",
            path.display(),
            self.records.len()
        );
        self.file = Some(path);
    }

    /// 关闭快照并清空内存中的记录，文件保持不变
    pub fn disable(&mut self) {
        self.file = None;
        self.records.clear();
    }

    /// 删除快照文件并清空内存中的记录
    pub fn clear(&mut self) {
        if let Some(path) = &self.file {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    warn!("无法删除路由快照{}：{}", path.display(), e);
                }
            }
        }
        self.records.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn cached_routes(&self) -> &[RouteRecord] {
        &self.records
    }

    /// 记录一条新注册的路由并立即写回磁盘。未启用时什么也不做。
    ///
    /// 同一方法下结构相同的模板只保留最新的一条。
    pub fn track(&mut self, record: RouteRecord) {
        if !self.is_enabled() {
            return;
        }
        let shape = pattern::shape(&record.path);
        match self
            .records
            .iter()
            .position(|r| r.method == record.method && pattern::shape(&r.path) == shape)
        {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
        if let Err(e) = self.write() {
            error!("写入路由快照失败：{}", e);
        }
    }

    /// 读取快照文件；任何读取或解析失败都返回空列表。
    pub fn load(path: &Path) -> Vec<RouteRecord> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("无法读取路由快照{}：{}，使用空缓存", path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_slice(&data) {
            Ok(records) => records,
            Err(e) => {
                warn!("路由快照{}已损坏：{}，使用空缓存", path.display(), e);
                Vec::new()
            }
        }
    }

    fn write(&self) -> io::Result<()> {
        let path = match &self.file {
            Some(path) => path,
            None => return Ok(()),
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &self.records)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!("路由快照已写入{}，共{}条", path.display(), self.records.len());
        Ok(())
    }
}
