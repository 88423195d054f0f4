use crate::core::request::Content;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

/// 只看第一個 candidate，取出第一個帶 inlineData 的 part；payload 原樣保留不解碼
pub fn extract_portrait(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let content = candidate.content.as_ref()?;

    content
        .parts
        .iter()
        .find_map(|part| part.inline_data.as_ref())
        .map(|inline| inline.data.clone())
}
