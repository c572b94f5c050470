//! Image generation service protocol.
//!
//! Actor portraits come from a separate image service rather than the game
//! server. The client asks it to render prompts, then fetches the returned
//! `image_url`s through the resource cache.

use serde::{Deserialize, Serialize};

/// Render one or more prompts. Defaults match the service's fast model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateImagesRequest {
    pub prompts: Vec<String>,
    pub model_name: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
}

impl Default for GenerateImagesRequest {
    fn default() -> Self {
        Self {
            prompts: Vec::new(),
            model_name: "sdxl-lightning".into(),
            negative_prompt: "worst quality, low quality, blurry".into(),
            width: 768,
            height: 768,
            num_inference_steps: 4,
            guidance_scale: 7.5,
        }
    }
}

impl GenerateImagesRequest {
    /// Upper bound the service accepts in one call.
    pub const MAX_PROMPTS: usize = 10;

    pub fn with_prompts<I, S>(prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompts: prompts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    pub prompt: String,
    pub filename: String,
    pub image_url: String,
    pub local_path: String,
}

/// Unlike the game server, the image service reports success as a bool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateImagesResponse {
    pub success: bool,
    pub message: String,
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageListResponse {
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = GenerateImagesRequest::with_prompts(["a cat"]);
        assert_eq!(request.prompts, vec!["a cat".to_string()]);
        assert_eq!(request.model_name, "sdxl-lightning");
        assert_eq!(request.width, 768);
        assert_eq!(request.num_inference_steps, 4);
    }
}
