//! Static UI string tables
//!
//! Only the strings the orchestration core produces itself live here:
//! notices, AI fallback texts, quick replies and keyword chips. Visual
//! copy belongs to whichever renderer drives the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    #[default]
    En,
}

impl Language {
    /// Map a locale tag such as `zh-CN` or `en_US.UTF-8` to a supported language.
    pub fn detect(locale: &str) -> Self {
        if locale.trim().to_ascii_lowercase().starts_with("zh") {
            Language::Zh
        } else {
            Language::En
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    /// Language name as used inside model prompts.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::Zh => "Chinese",
            Language::En => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "cn" | "chinese" => Ok(Language::Zh),
            "en" | "english" => Ok(Language::En),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

pub struct Translations {
    pub explore: &'static str,
    pub trip: &'static str,
    pub all_discovery: &'static str,
    pub attractions: &'static str,
    pub hsr: &'static str,
    pub flights: &'static str,
    pub self_drive: &'static str,
    pub hotels: &'static str,
    pub museums: &'static str,
    pub rating_unit: &'static str,
    /// Keyword chips on the welcome view
    pub suggestions: &'static [&'static str],
    pub quick_replies: &'static [&'static str],
    pub login_required: &'static str,
    pub save_failed: &'static str,
    pub remove_failed: &'static str,
    pub load_failed: &'static str,
    pub advice_unavailable: &'static str,
    pub advice_rate_limited: &'static str,
    pub ai_unavailable: &'static str,
    pub itinerary_failed: &'static str,
    pub default_preference: &'static str,
    pub subscription_success: &'static str,
    pub subscription_failed: &'static str,
    pub subscription_canceled: &'static str,
    pub cancel_failed: &'static str,
    pub thinking: &'static str,
}

static EN: Translations = Translations {
    explore: "Explore",
    trip: "Trip",
    all_discovery: "All",
    attractions: "Attractions",
    hsr: "High-speed rail",
    flights: "Flights",
    self_drive: "Self-drive",
    hotels: "Hotels",
    museums: "Museums",
    rating_unit: "pts",
    suggestions: &[
        "Nature escape",
        "Family day out",
        "Art & design",
        "Sunset views",
        "Local food",
        "Road trip",
        "History & temples",
        "Surprise me",
    ],
    quick_replies: &[
        "Recommend popular destinations",
        "Plan a weekend trip for me",
        "Family-friendly places",
        "Best food attractions",
        "Learn about local culture",
    ],
    login_required: "Please login first",
    save_failed: "Could not save this itinerary, please try again",
    remove_failed: "Could not remove this itinerary, please try again",
    load_failed: "Could not load your saved itineraries",
    advice_unavailable: "Sorry, I can't process your request right now.",
    advice_rate_limited: "Request too frequent, please try later. ✨",
    ai_unavailable: "AI service temporarily unavailable, please try later",
    itinerary_failed: "Itinerary generation failed. Tap to retry.",
    default_preference: "Deep Experience",
    subscription_success: "Subscription successful! Thank you for your support",
    subscription_failed: "Subscription failed, please try again later",
    subscription_canceled: "Subscription canceled",
    cancel_failed: "Failed to cancel subscription, please try again later",
    thinking: "Thinking...",
};

static ZH: Translations = Translations {
    explore: "探索",
    trip: "行程",
    all_discovery: "全部发现",
    attractions: "景点",
    hsr: "高铁",
    flights: "航班",
    self_drive: "自驾",
    hotels: "酒店",
    museums: "博物馆",
    rating_unit: "分",
    suggestions: &[
        "亲近自然",
        "亲子出游",
        "艺术设计",
        "看日落",
        "寻味美食",
        "公路旅行",
        "历史古迹",
        "随便逛逛",
    ],
    quick_replies: &[
        "推荐一些热门目的地",
        "帮我规划一个周末旅行",
        "有哪些适合家庭出游的地方",
        "推荐一些美食景点",
        "我想了解当地文化",
    ],
    login_required: "请先登录",
    save_failed: "保存行程失败，请重试",
    remove_failed: "取消保存失败，请重试",
    load_failed: "加载行程失败",
    advice_unavailable: "抱歉，我暂时无法处理您的请求。",
    advice_rate_limited: "请求过于频繁，请稍后再试。✨",
    ai_unavailable: "AI 服务暂时不可用，请稍后再试",
    itinerary_failed: "行程生成失败，点击重试",
    default_preference: "一日深度体验游",
    subscription_success: "订阅成功！感谢您的支持",
    subscription_failed: "订阅失败，请稍后再试",
    subscription_canceled: "订阅已取消",
    cancel_failed: "取消订阅失败，请稍后再试",
    thinking: "思考中...",
};

impl Translations {
    pub fn for_language(lang: Language) -> &'static Translations {
        match lang {
            Language::Zh => &ZH,
            Language::En => &EN,
        }
    }
}

pub fn translations(lang: Language) -> &'static Translations {
    Translations::for_language(lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("zh-CN", Language::Zh)]
    #[case("zh_TW.UTF-8", Language::Zh)]
    #[case("en-US", Language::En)]
    #[case("fr", Language::En)]
    #[case("", Language::En)]
    fn test_detect(#[case] locale: &str, #[case] expected: Language) {
        assert_eq!(Language::detect(locale), expected);
    }

    #[test]
    fn test_tables_have_matching_list_lengths() {
        assert_eq!(EN.suggestions.len(), ZH.suggestions.len());
        assert_eq!(EN.quick_replies.len(), ZH.quick_replies.len());
        assert_eq!(EN.quick_replies.len(), 5);
    }

    #[test]
    fn test_parse_language() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("zh".parse::<Language>().unwrap(), Language::Zh);
        assert!("de".parse::<Language>().is_err());
    }
}
