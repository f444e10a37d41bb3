//! 数据归一化辅助函数
//!
//! 服务器返回的评论字段形态不统一（作者可能是字符串或嵌套对象，
//! 头像和时间戳可能缺失），归一化逻辑集中在这里。

/// 作者名兜底值（服务器未返回可用名字时使用）
pub const UNKNOWN_AUTHOR: &str = "Unknown User";

/// 评论内容的最大长度（客户端校验）
pub const MAX_COMMENT_LEN: usize = 500;

/// 拼接显示名：firstName + lastName，去除首尾空白，
/// 两者都为空时返回兜底值
pub fn resolve_display_name(first_name: &str, last_name: &str) -> String {
    let name = format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string();
    if name.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        name
    }
}

/// 根据显示名生成占位头像 URL（服务器未返回头像时使用）
pub fn placeholder_avatar_url(display_name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        urlencoding::encode(display_name)
    )
}

/// 生成本地兜底评论 ID（当前毫秒时间戳）
pub fn generate_fallback_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// 当前时间的 RFC-3339 字符串（影子评论的时间戳）
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
