use crate::i18n::{Language, Translations};
use serde::Serialize;

/// User-visible, localized transient message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    LoginRequired,
    SaveFailed,
    RemoveFailed,
    LoadFailed,
    SubscriptionSucceeded,
    SubscriptionFailed,
    SubscriptionCanceled,
    CancelFailed,
}

impl NoticeKind {
    pub fn is_error(self) -> bool {
        !matches!(
            self,
            NoticeKind::SubscriptionSucceeded | NoticeKind::SubscriptionCanceled
        )
    }
}

impl Notice {
    pub fn new(kind: NoticeKind, lang: Language) -> Self {
        let t = Translations::for_language(lang);
        let message = match kind {
            NoticeKind::LoginRequired => t.login_required,
            NoticeKind::SaveFailed => t.save_failed,
            NoticeKind::RemoveFailed => t.remove_failed,
            NoticeKind::LoadFailed => t.load_failed,
            NoticeKind::SubscriptionSucceeded => t.subscription_success,
            NoticeKind::SubscriptionFailed => t.subscription_failed,
            NoticeKind::SubscriptionCanceled => t.subscription_canceled,
            NoticeKind::CancelFailed => t.cancel_failed,
        };
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_message() {
        assert_eq!(
            Notice::new(NoticeKind::LoginRequired, Language::En).message,
            "Please login first"
        );
        assert_eq!(
            Notice::new(NoticeKind::LoginRequired, Language::Zh).message,
            "请先登录"
        );
        assert!(!NoticeKind::SubscriptionSucceeded.is_error());
        assert!(NoticeKind::SaveFailed.is_error());
    }
}
