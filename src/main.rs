// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由演示程序
//!
//! 从文件（第一个命令行参数）或标准输入读取一条原始 HTTP 请求，
//! 交给预先注册好的路由器处理，并把完整的响应报文写到标准输出。
//! 日志写到标准错误，避免与响应混在一起。

use std::{
    env,
    error::Error,
    fs,
    io::{self, Read, Write},
    path::Path,
    process,
    sync::Arc,
};

use dromos::{
    Arguments, Config, Controller, ErrorTranslator, Exception, Request, Response, RouteResource,
    Router, Signature, Target,
};
use log::{info, warn, LevelFilter};
use log4rs::{
    append::console::{ConsoleAppender, Target as ConsoleTarget},
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use serde_json::json;

const LOG_CONFIG: &str = "config/log4rs.yaml";
const APP_CONFIG: &str = "config/development.toml";

/// 演示用控制器，提供资源路由的 get 与 delete 两个方法
struct UserController;

impl Controller for UserController {
    fn name(&self) -> String {
        "UserController".to_string()
    }

    fn describe(&self, method: &str) -> Option<Signature> {
        match method {
            "get" | "delete" => Some(Signature::new().response().param("id")),
            _ => None,
        }
    }

    fn call(&self, method: &str, mut args: Arguments) -> Result<Response, Exception> {
        let id = args.value("id").unwrap_or_default().to_string();
        let response = args.take_response();
        match method {
            "get" => response.json(&json!({ "user": id })),
            "delete" => Ok(response.with_status(204)),
            other => Err(Exception::internal(format!("未知方法：{}", other))),
        }
    }
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    if Path::new(LOG_CONFIG).exists() {
        log4rs::init_file(LOG_CONFIG, Default::default())?;
        return Ok(());
    }
    let stderr = ConsoleAppender::builder()
        .target(ConsoleTarget::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {m}{n}")))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn build_router(config: Config) -> Router {
    let mut router = Router::with_config(config);
    router
        .get(
            "/home/{id}",
            Target::closure(Signature::new().response().param("id"), |mut args| {
                let id = args.value("id").unwrap_or_default().to_string();
                args.take_response()
                    .with_header("x-custom-header", "dromos")
                    .json(&json!({ "id": id }))
            }),
        )
        .get(
            "/data/{id}/user/{user_id}",
            Target::closure(
                Signature::new().param("id").param("user_id").response(),
                |mut args| {
                    let id = args.value("id").unwrap_or_default().to_string();
                    let user_id = args.value("user_id").unwrap_or_default().to_string();
                    args.take_response()
                        .json(&json!({ "id": id, "user_id": user_id }))
                },
            ),
        )
        .register_resource(
            RouteResource::new("/users/{id}", Arc::new(UserController))
                .only_methods(&["get", "delete"]),
        );
    router
}

fn read_input() -> io::Result<Vec<u8>> {
    match env::args().nth(1) {
        Some(path) => fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("日志系统初始化失败：{}", e);
    }

    let config = Config::from_toml(APP_CONFIG);
    info!("配置文件已载入");

    let mut router = build_router(config);
    match router.check_routes() {
        Ok(routes) => info!("已注册{}条路由", routes.len()),
        Err(e) => warn!("路由检查未通过：{}", e),
    }

    let buffer = match read_input() {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("读取请求失败：{}", e);
            process::exit(1);
        }
    };

    let response = match Request::try_from(&buffer, 1) {
        Ok(request) => router.handle(request),
        Err(e) => ErrorTranslator::new().translate(&e, 1),
    };

    let mut stdout = io::stdout();
    if let Err(e) = stdout
        .write_all(&response.as_bytes())
        .and_then(|_| stdout.flush())
    {
        eprintln!("写出响应失败：{}", e);
        process::exit(1);
    }
}
