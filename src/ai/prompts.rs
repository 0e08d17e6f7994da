//! System and user prompts per operation and language.

use crate::i18n::Language;
use crate::types::Itinerary;

pub fn advice_system(lang: Language) -> String {
    match lang {
        Language::Zh => {
            "你是一个智能旅行助手，请简洁友好地回复用户，引导用户查看地图上的目的地。".to_string()
        }
        Language::En => "You are a smart travel assistant. Reply concisely and warmly, \
             and guide the user to check the destinations on the map."
            .to_string(),
    }
}

pub fn itinerary_system(
    destination: &str,
    preferences: &str,
    lang: Language,
    previous: Option<&Itinerary>,
) -> String {
    let mut prompt = match lang {
        Language::Zh => format!(
            "你是一个旅行规划专家。请为用户生成\"{}\"的一日游行程。\n用户偏好：{}\n\
             请只返回 JSON，字段包括 date, totalBudget, transport, highlights, aiComment, \
             items（time, activity, description, lat, lng, transportInfo, aiPersonalizedReason, cost）。",
            destination, preferences
        ),
        Language::En => format!(
            "You are a travel planning expert. Generate a one-day itinerary for \"{}\".\n\
             User preferences: {}\n\
             Return JSON only with: date, totalBudget, transport, highlights, aiComment, \
             items (time, activity, description, lat, lng, transportInfo, aiPersonalizedReason, cost).",
            destination, preferences
        ),
    };

    if let Some(previous) = previous {
        let current = serde_json::to_string(previous).unwrap_or_default();
        match lang {
            Language::Zh => prompt.push_str(&format!(
                "\n这是用户当前的行程，请按偏好做微调，保留其余部分：\n{}",
                current
            )),
            Language::En => prompt.push_str(&format!(
                "\nThis is the user's current itinerary. Adjust it to the preferences and keep the rest:\n{}",
                current
            )),
        }
    }
    prompt
}

pub fn itinerary_user(destination: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!("请生成{}的详细行程", destination),
        Language::En => format!("Please create a detailed itinerary for {}", destination),
    }
}

pub fn city_system(query: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!(
            "用户在搜索城市\"{}\"。请返回匹配的真实城市信息，\
             以 JSON 格式返回：{{ \"city\": \"城市名\", \"country\": \"国家名\", \"code\": \"机场代码\", \"flag\": \"国旗表情\" }}",
            query
        ),
        Language::En => format!(
            "The user is searching for the city \"{}\". Return the real matching city as JSON: \
             {{ \"city\": \"City Name\", \"country\": \"Country\", \"code\": \"Airport Code\", \"flag\": \"Flag Emoji\" }}",
            query
        ),
    }
}

pub fn city_user(query: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!("搜索城市：{}", query),
        Language::En => format!("Search city: {}", query),
    }
}

pub fn destinations_system(
    query: &str,
    lang: Language,
    excluded_ids: &[String],
    max_results: usize,
) -> String {
    let mut prompt = match lang {
        Language::Zh => format!(
            "你是一个智能旅行推荐助手。根据用户需求\"{}\"推荐最匹配的真实旅行目的地（最多{}个）。\n\
             每个目的地包含 name, location, lat, lng, reason（1-2句推荐理由）, distance（距北京的大致距离）, \
             suggestedTransport, imageUrl, rating（4.0-5.0）, budget。\n\
             只返回 JSON：{{\"destinations\": [...], \"message\": \"50字以内的简短回复\"}}",
            query, max_results
        ),
        Language::En => format!(
            "You are a smart travel assistant. Recommend up to {} real destinations that best match \"{}\".\n\
             Each destination has name, location, lat, lng, reason (1-2 sentences), distance (from Beijing), \
             suggestedTransport, imageUrl, rating (4.0-5.0), budget.\n\
             Return JSON only: {{\"destinations\": [...], \"message\": \"brief reply under 50 words\"}}",
            max_results, query
        ),
    };

    if !excluded_ids.is_empty() {
        let ids = excluded_ids.join(", ");
        match lang {
            Language::Zh => prompt.push_str(&format!("\n之前已推荐过的目的地ID（请避免重复）：{}", ids)),
            Language::En => {
                prompt.push_str(&format!("\nAlready recommended ids (do not repeat): {}", ids))
            }
        }
    }
    prompt
}

pub fn destinations_user(query: &str, lang: Language) -> String {
    match lang {
        Language::Zh => format!("请搜索推荐目的地：{}", query),
        Language::En => format!("Recommend destinations for: {}", query),
    }
}
