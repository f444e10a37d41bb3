//! GraceLink 社区 SDK 根模块

pub mod auth;
pub mod client;
pub mod comment;
pub mod error;
pub mod like;
pub mod serialization;
pub mod types;

// 重新导出认证相关函数
pub use auth::{login_async, new_session_handle, SessionHandle, SessionUser};

// 重新导出评论同步相关类型和函数
pub use comment::{
    Comment, CommentListener, CommentSyncer, CommentSyncerConfig, CommentThread,
};

// 重新导出错误与内容标识类型
pub use error::{SdkError, SdkResult};
pub use like::LikeState;
pub use types::{ContentKind, ContentRef};
