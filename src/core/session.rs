//! 会话记录：进程级、创建后不可变
//!
//! 仅在配置了持久化记忆后端时创建；会话 ID 优先取配置，否则取随机 UUID 的前 8 位。

use chrono::{DateTime, Utc};

/// 托管记忆中的 user_id 前缀
const USER_ID_PREFIX: &str = "ai_agent_user_";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    session_id: String,
    started_at: DateTime<Utc>,
}

impl Session {
    /// 使用给定 ID（空白视为未提供）或生成新 ID
    pub fn start(session_id: Option<&str>) -> Self {
        let session_id = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()[..8].to_string());
        Self {
            session_id,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> String {
        format!("{USER_ID_PREFIX}{}", self.session_id)
    }

    /// 会话起始时写入记忆库的 system 记录
    pub fn start_notice(&self, capabilities: &[String]) -> String {
        format!(
            "New AI Agent session started at {}. Session ID: {}. \
             This is a comprehensive AI assistant with capabilities including {}.",
            self.started_at.to_rfc3339(),
            self.session_id,
            capabilities.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_eight_chars() {
        let s = Session::start(None);
        assert_eq!(s.id().len(), 8);
        assert!(s.user_id().starts_with("ai_agent_user_"));
    }

    #[test]
    fn test_configured_id_is_used() {
        let s = Session::start(Some(" demo42 "));
        assert_eq!(s.id(), "demo42");
        assert_eq!(s.user_id(), "ai_agent_user_demo42");
        assert_eq!(Session::start(Some("  ")).id().len(), 8);
    }

    #[test]
    fn test_start_notice_lists_capabilities() {
        let s = Session::start(Some("abc"));
        let notice = s.start_notice(&["calculator".into(), "weather".into()]);
        assert!(notice.contains("Session ID: abc"));
        assert!(notice.ends_with("calculator, weather."));
    }
}
