// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 处理器参数解析模块
//!
//! 每个处理器以 [`Signature`] 显式声明它需要的参数：当前请求、一个新建的响应，
//! 或按名称取得的路径参数（可带默认值）。解析器按声明顺序逐一供给实参，
//! 遇到既无路径参数也无默认值的命名参数时报告 `UnresolvableParameter`。

use crate::{exception::Exception, pattern::ParameterMap, request::Request, response::Response};

/// 处理器声明的单个参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// 当前请求
    Request,
    /// 新建的空响应
    Response,
    /// 路径参数，`default` 为缺省值
    Named {
        name: String,
        default: Option<String>,
    },
}

/// 处理器的参数描述，顺序即实参顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(mut self) -> Self {
        self.params.push(Param::Request);
        self
    }

    pub fn response(mut self) -> Self {
        self.params.push(Param::Response);
        self
    }

    /// 必需的路径参数
    pub fn param(mut self, name: &str) -> Self {
        self.params.push(Param::Named {
            name: name.to_string(),
            default: None,
        });
        self
    }

    /// 可选的路径参数，缺失时使用 `default`
    pub fn optional(mut self, name: &str, default: &str) -> Self {
        self.params.push(Param::Named {
            name: name.to_string(),
            default: Some(default.to_string()),
        });
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// 解析得到的单个实参。
#[derive(Debug, Clone)]
pub enum Argument {
    Request(Request),
    Response(Response),
    Value { name: String, value: String },
}

/// 按声明顺序排列的实参列表。
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    items: Vec<Argument>,
}

impl Arguments {
    pub fn new(items: Vec<Argument>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.items.iter()
    }

    /// 第一个请求实参
    pub fn request(&self) -> Option<&Request> {
        self.items.iter().find_map(|arg| match arg {
            Argument::Request(request) => Some(request),
            _ => None,
        })
    }

    /// 取出第一个响应实参；处理器未声明响应参数时返回一个新的响应
    pub fn take_response(&mut self) -> Response {
        let index = self
            .items
            .iter()
            .position(|arg| matches!(arg, Argument::Response(_)));
        match index.map(|i| self.items.remove(i)) {
            Some(Argument::Response(response)) => response,
            _ => Response::new(),
        }
    }

    /// 按名称读取命名实参
    pub fn value(&self, name: &str) -> Option<&str> {
        self.items.iter().find_map(|arg| match arg {
            Argument::Value { name: key, value } if key == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// 按声明顺序列出全部命名实参的取值
    pub fn values(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|arg| match arg {
                Argument::Value { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn into_vec(self) -> Vec<Argument> {
        self.items
    }
}

/// 为处理器签名解析实参。
pub fn resolve(
    signature: &Signature,
    params: &ParameterMap,
    request: &Request,
) -> Result<Arguments, Exception> {
    let mut items = Vec::with_capacity(signature.params().len());
    for param in signature.params() {
        let argument = match param {
            Param::Request => Argument::Request(request.clone()),
            Param::Response => Argument::Response(Response::new()),
            Param::Named { name, default } => match (params.get(name), default) {
                (Some(value), _) => Argument::Value {
                    name: name.clone(),
                    value: value.to_string(),
                },
                (None, Some(default)) => Argument::Value {
                    name: name.clone(),
                    value: default.clone(),
                },
                (None, None) => {
                    return Err(Exception::UnresolvableParameter { name: name.clone() });
                }
            },
        };
        items.push(argument);
    }
    Ok(Arguments::new(items))
}
