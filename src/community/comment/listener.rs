//! 评论同步监听器回调接口

use async_trait::async_trait;

/// 评论同步监听器回调接口
///
/// 显式拉取触发 `on_sync_start`/`on_sync_finish`（宿主据此显示加载指示），
/// 静默轮询不触发这两个回调
#[async_trait]
pub trait CommentListener: Send + Sync {
    /// 显式拉取开始
    async fn on_sync_start(&self, item_id: String);

    /// 显式拉取完成
    async fn on_sync_finish(&self, item_id: String);

    /// 拉取失败（显式与静默都会触发，状态保持不变）
    async fn on_sync_failed(&self, item_id: String, error: String);

    /// 已提交评论列表发生变化（JSON 序列化的评论数组）
    async fn on_comments_changed(&self, item_id: String, comments_json: String);

    /// 评论数变化
    async fn on_comment_count_changed(&self, item_id: String, count: i64);

    /// 评论提交失败，影子评论已回收
    async fn on_submit_failed(&self, item_id: String, error: String);
}

/// 空实现（默认监听器）
pub struct EmptyCommentListener;

#[async_trait]
impl CommentListener for EmptyCommentListener {
    async fn on_sync_start(&self, _item_id: String) {}
    async fn on_sync_finish(&self, _item_id: String) {}
    async fn on_sync_failed(&self, _item_id: String, _error: String) {}
    async fn on_comments_changed(&self, _item_id: String, _comments_json: String) {}
    async fn on_comment_count_changed(&self, _item_id: String, _count: i64) {}
    async fn on_submit_failed(&self, _item_id: String, _error: String) {}
}
