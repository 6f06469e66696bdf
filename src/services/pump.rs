use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    error::AppError,
    models::trip::round2,
    services::gemini::{GenerateRequest, GenerationConfig, GenerativeModel, Part, RemoteError},
};

const PUMP_PROMPT: &str = "Analyze the image of this gas pump display. Extract the numeric value for 'gallons'. Return a JSON object with a single key 'gallons'. If the value cannot be determined, return null for 'gallons'.";

/// Reads the dispensed fuel quantity off a photo of a pump display.
#[derive(Clone)]
pub struct PumpReader {
    model: Arc<dyn GenerativeModel>,
}

impl PumpReader {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// `Ok(None)` means the model answered but no number could be read.
    /// Transport and decoding failures are logged and reported as
    /// [`AppError::ImageAnalysis`].
    pub async fn extract_gallons(
        &self,
        image: Vec<u8>,
        mime_type: &str,
    ) -> Result<Option<f64>, AppError> {
        match self.request_gallons(image, mime_type).await {
            Ok(Some(gallons)) => Ok(Some(gallons)),
            Ok(None) => {
                info!("pump photo did not yield a gallons value");
                Ok(None)
            }
            Err(err) => {
                error!("error extracting gallons from image: {err}");
                Err(AppError::ImageAnalysis)
            }
        }
    }

    async fn request_gallons(
        &self,
        image: Vec<u8>,
        mime_type: &str,
    ) -> Result<Option<f64>, RemoteError> {
        let request = GenerateRequest {
            parts: vec![
                Part::InlineImage {
                    mime_type: mime_type.to_string(),
                    data: image,
                },
                Part::Text(PUMP_PROMPT.to_string()),
            ],
            config: GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(gallons_schema()),
                ..GenerationConfig::default()
            },
        };
        let text = self.model.generate(request).await?;
        parse_gallons(&text)
    }
}

fn gallons_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "gallons": {
                "type": "NUMBER",
                "description": "The number of gallons pumped."
            }
        }
    })
}

fn parse_gallons(text: &str) -> Result<Option<f64>, RemoteError> {
    let value: Value = serde_json::from_str(text.trim())?;
    Ok(value
        .get("gallons")
        .and_then(Value::as_f64)
        .filter(|gallons| gallons.is_finite())
        .map(round2))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct CannedModel {
        reply: Result<String, ()>,
        seen: Mutex<Option<GenerateRequest>>,
    }

    impl CannedModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate(&self, request: GenerateRequest) -> Result<String, RemoteError> {
            *self.seen.lock().unwrap() = Some(request);
            self.reply.clone().map_err(|_| RemoteError::EmptyResponse)
        }
    }

    #[test]
    fn parses_and_rounds_numbers() {
        assert_eq!(parse_gallons(r#"{"gallons": 10.456}"#).unwrap(), Some(10.46));
        assert_eq!(parse_gallons(" {\"gallons\": 12} ").unwrap(), Some(12.0));
    }

    #[test]
    fn missing_or_non_numeric_field_is_no_answer() {
        assert_eq!(parse_gallons(r#"{"gallons": null}"#).unwrap(), None);
        assert_eq!(parse_gallons(r#"{"gallons": "ten"}"#).unwrap(), None);
        assert_eq!(parse_gallons("{}").unwrap(), None);
        assert_eq!(parse_gallons("[1]").unwrap(), None);
    }

    #[test]
    fn non_json_text_is_an_error() {
        assert!(matches!(
            parse_gallons("about ten gallons"),
            Err(RemoteError::MalformedJson(_))
        ));
    }

    #[tokio::test]
    async fn sends_image_then_instruction_with_json_schema() {
        let model = CannedModel::replying(r#"{"gallons": 9.87}"#);
        let reader = PumpReader::new(model.clone());

        let gallons = reader
            .extract_gallons(vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(gallons, Some(9.87));

        let seen = model.seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            seen.parts[0],
            Part::InlineImage {
                mime_type: "image/jpeg".into(),
                data: vec![1, 2, 3],
            }
        );
        assert!(matches!(&seen.parts[1], Part::Text(text) if text.contains("'gallons'")));
        assert_eq!(
            seen.config.response_mime_type.as_deref(),
            Some("application/json")
        );
        assert_eq!(
            seen.config.response_schema.unwrap()["properties"]["gallons"]["type"],
            "NUMBER"
        );
    }

    #[tokio::test]
    async fn unresolved_and_failed_are_distinct() {
        let unresolved = PumpReader::new(CannedModel::replying(r#"{"gallons": null}"#));
        assert_eq!(
            unresolved.extract_gallons(vec![0], "image/png").await.unwrap(),
            None
        );

        let broken = PumpReader::new(CannedModel::failing());
        assert!(matches!(
            broken.extract_gallons(vec![0], "image/png").await,
            Err(AppError::ImageAnalysis)
        ));

        let garbled = PumpReader::new(CannedModel::replying("not json"));
        assert!(matches!(
            garbled.extract_gallons(vec![0], "image/png").await,
            Err(AppError::ImageAnalysis)
        ));
    }
}
