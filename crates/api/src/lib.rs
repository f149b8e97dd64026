//! # `kizashi-api` - HTTP API 网关
//!
//! 本 crate 是 Kizashi 行情情绪服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自前端页面或浏览器的 HTTP 请求
//! - 调用下层 `ReportManager` 构建报表
//! - 将领域模型转换为 DTO 返回给前端

pub mod routes;
pub mod server;
pub mod types;
