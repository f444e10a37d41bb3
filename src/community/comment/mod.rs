//! 评论模块
//!
//! 实现评论的近实时同步：轮询 + 单调增长合并 + 乐观追加

pub mod api;
pub mod listener;
pub mod models;
pub mod service;
pub mod state;
pub mod types;

// 重新导出主要类型和函数
pub use api::{CommentApi, CommentBackend};
pub use listener::{CommentListener, EmptyCommentListener};
pub use models::{CommentSyncerConfig, DEFAULT_REFRESH_INTERVAL_MS};
pub use service::CommentSyncer;
pub use state::CommentThread;
pub use types::{normalize_comment_list, Comment, CommentListEnvelope, RawComment};
