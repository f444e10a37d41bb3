//! SDK 统一错误类型
//!
//! 适配器边界上的所有失败都通过显式的 `SdkError` 返回，
//! 调用方不需要依赖跨 async 边界的异常传播来发现错误分支。

use thiserror::Error;

/// SDK 错误分类
#[derive(Debug, Error)]
pub enum SdkError {
    /// 未登录（预期的本地拦截，不会发起任何网络请求）
    #[error("未登录，无法执行该操作")]
    Unauthenticated,

    /// 客户端参数校验失败
    #[error("参数校验失败: {0}")]
    Validation(String),

    /// 网络请求失败（连接、超时等）
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP 状态码错误
    #[error("HTTP 错误 {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// 服务器返回 success=false 或缺少必要字段
    #[error("服务器错误: {message}")]
    Api { message: String },

    /// 响应反序列化失败
    #[error("响应反序列化失败: {0}")]
    Malformed(#[from] serde_json::Error),

    /// 配置无效（例如 token 无法作为 HTTP 头）
    #[error("配置无效: {0}")]
    InvalidConfig(String),
}

/// SDK 统一结果类型
pub type SdkResult<T> = Result<T, SdkError>;
