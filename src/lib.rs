pub mod cache;
pub mod compression;
pub mod config;
pub mod dispatcher;
pub mod exception;
pub mod header;
pub mod middleware;
pub mod param;
pub mod pattern;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod response;
pub mod route;
pub mod router;
pub mod snapshot;
pub mod stream;
pub mod table;
pub mod translator;

pub use cache::PatternCache;
pub use compression::Compression;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use exception::{Exception, MissingTarget};
pub use middleware::{Middleware, Pipeline, RequestHandler};
pub use param::{HttpEncoding, HttpRequestMethod, HttpVersion};
pub use pattern::{match_template, ParameterMap};
pub use request::Request;
pub use resolver::{resolve, Argument, Arguments, Signature};
pub use resource::RouteResource;
pub use response::Response;
pub use route::{Controller, HandlerRecord, Route, RouteRecord, Target};
pub use router::Router;
pub use snapshot::RouteSnapshot;
pub use table::RouteTable;
pub use translator::ErrorTranslator;
