// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由表模块
//!
//! 路由按 HTTP 方法分组存放，组内保持注册顺序。
//! 同一方法下结构相同的模板（占位符名称不同也算）只保留最后一次注册，
//! 新目标替换旧目标且保留旧的位置。
//!
//! 控制器方法缺失不会让注册失败：缺失记录先被收集起来，
//! 在 `check_routes` 时一次性汇总报告并清空。

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, warn};

use crate::{
    cache::PatternCache,
    exception::{Exception, MissingTarget},
    param::HttpRequestMethod,
    pattern,
    route::{Controller, HandlerRecord, Route, RouteRecord, Target},
    snapshot::RouteSnapshot,
};

#[derive(Default)]
pub struct RouteTable {
    /// 方法按第一次注册的顺序排列
    routes: Vec<(HttpRequestMethod, Vec<Route>)>,
    missing: Mutex<Vec<MissingTarget>>,
    snapshot: RouteSnapshot,
    /// 注册时编译模板；同一模板在不同方法下共享编译结果
    patterns: PatternCache,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern_cache_size(size: usize) -> Self {
        Self {
            patterns: PatternCache::from_capacity(size),
            ..Self::default()
        }
    }

    /// 注册路由。该操作从不失败。
    pub fn register(&mut self, method: HttpRequestMethod, template: &str, target: Target) {
        if let Target::Controller { controller, method: name } = &target {
            if controller.describe(name).is_none() {
                warn!(
                    "控制器{}上不存在方法{}，路由{} {}将在检查时报告",
                    controller.name(),
                    name,
                    method,
                    template
                );
                self.lock_missing()
                    .push(MissingTarget::new(&controller.name(), name));
            }
        }

        let pattern = self.patterns.find_or_compile(template);
        if let Err(e) = &pattern {
            error!("路由模板{}编译失败：{}，匹配时将报告该错误", template, e);
        }
        let route = Route::with_pattern(method, template, pattern, target);
        let record = route.record();
        let shape = pattern::shape(template);

        let index = match self.routes.iter().position(|(m, _)| *m == method) {
            Some(index) => index,
            None => {
                self.routes.push((method, Vec::new()));
                self.routes.len() - 1
            }
        };
        let list = &mut self.routes[index].1;
        match list
            .iter()
            .position(|existing| pattern::shape(existing.template()) == shape)
        {
            Some(position) => {
                debug!(
                    "路由{} {}覆盖了已有的{}",
                    method,
                    template,
                    list[position].template()
                );
                list[position] = route;
            }
            None => {
                debug!("注册路由{} {}", method, template);
                list.push(route);
            }
        }

        self.snapshot.track(record);
    }

    /// 某个方法下按注册顺序排列的路由
    pub fn lookup(&self, method: HttpRequestMethod) -> Option<&[Route]> {
        self.routes
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, list)| list.as_slice())
            .filter(|list| !list.is_empty())
    }

    /// 至少注册了一条路由的方法
    pub fn methods(&self) -> Vec<HttpRequestMethod> {
        self.routes
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(m, _)| *m)
            .collect()
    }

    /// 全部路由，按方法分组、组内按注册顺序
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().flat_map(|(_, list)| list.iter())
    }

    pub fn len(&self) -> usize {
        self.routes.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出并清空缺失目标列表
    pub fn flush_missing(&self) -> Vec<MissingTarget> {
        std::mem::take(&mut *self.lock_missing())
    }

    /// 导出路由表。存在缺失目标时以 `TargetNotFound` 失败，缺失列表只报告一次。
    pub fn check_routes(&self) -> Result<Vec<RouteRecord>, Exception> {
        let missing = self.flush_missing();
        if !missing.is_empty() {
            return Err(Exception::TargetNotFound { missing });
        }
        Ok(self.routes().map(Route::record).collect())
    }

    /// 从快照记录重建控制器路由，返回成功恢复的条数。
    ///
    /// 闭包路由无法从快照恢复，会被跳过。
    pub fn restore<F>(&mut self, records: &[RouteRecord], lookup: F) -> usize
    where
        F: Fn(&str) -> Option<Arc<dyn Controller>>,
    {
        let mut restored = 0;
        for record in records {
            match &record.handler {
                HandlerRecord::Closure => {
                    warn!(
                        "快照中的闭包路由{} {}无法恢复，已跳过",
                        record.method, record.path
                    );
                }
                HandlerRecord::Controller { owner, method } => match lookup(owner) {
                    Some(controller) => {
                        self.register(
                            record.method,
                            &record.path,
                            Target::controller(controller, method),
                        );
                        restored += 1;
                    }
                    None => {
                        warn!("快照引用了未知的控制器{}，路由{} {}已跳过", owner, record.method, record.path);
                    }
                },
            }
        }
        debug!("从快照恢复了{}条路由", restored);
        restored
    }

    pub fn snapshot(&self) -> &RouteSnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut RouteSnapshot {
        &mut self.snapshot
    }

    fn lock_missing(&self) -> MutexGuard<'_, Vec<MissingTarget>> {
        match self.missing.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("缺失目标列表的锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }
}
