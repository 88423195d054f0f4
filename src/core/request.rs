use crate::domain::model::ImageAsset;
use serde::{Deserialize, Serialize};

pub const PORTRAIT_INSTRUCTION: &str =
    "Generate emotional portrait with adult holding hands with child version.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    // 回應裡缺欄位時當空字串處理，不要讓整個 body 解析失敗
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub aspect_ratio: String,
    pub number_of_images: u32,
}

/// 組出固定格式的請求：指令文字在前，接著小孩照、大人照
pub fn portrait_request(child: &ImageAsset, adult: &ImageAsset) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part {
                    text: Some(PORTRAIT_INSTRUCTION.to_string()),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: child.media_type.clone(),
                        data: child.data.clone(),
                    }),
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: adult.media_type.clone(),
                        data: adult.data.clone(),
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            aspect_ratio: "3:4".to_string(),
            number_of_images: 1,
        },
    }
}
