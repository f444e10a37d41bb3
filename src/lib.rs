pub mod community;

// 重新导出常用类型和函数，方便外部使用
pub use community::{
    client::{ClientConfig, CommunityClient},
    comment::{Comment, CommentListener, CommentSyncer, CommentSyncerConfig},
    error::{SdkError, SdkResult},
    like::LikeState,
    login_async,
    types::{ContentKind, ContentRef},
};
