use std::sync::Arc;

use tracing::error;

use crate::{
    models::trip::TripLog,
    services::gemini::{GenerateRequest, GenerationConfig, GenerativeModel, Part, RemoteError},
};

pub const MIN_TRIPS_FOR_TIP: usize = 3;
pub const TIP_HISTORY_LEN: usize = 5;
pub const NOT_ENOUGH_TRIPS: &str = "Add at least 3 trips to get personalized mileage tips.";
pub const TIP_UNAVAILABLE: &str =
    "Sorry, I couldn't fetch a tip right now. Please try again later.";

#[derive(Clone)]
pub struct TipService {
    model: Arc<dyn GenerativeModel>,
}

impl TipService {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Always yields something to show. Small logs never reach the model and
    /// remote failures turn into [`TIP_UNAVAILABLE`].
    pub async fn tip_for(&self, log: &TripLog) -> String {
        if log.len() < MIN_TRIPS_FOR_TIP {
            return NOT_ENOUGH_TRIPS.to_string();
        }
        let history = log.recent_mpg(TIP_HISTORY_LEN);
        match self.get_tip(&history).await {
            Ok(tip) => tip,
            Err(err) => {
                error!("error fetching mileage tip: {err}");
                TIP_UNAVAILABLE.to_string()
            }
        }
    }

    pub async fn get_tip(&self, mpg_history: &[f64]) -> Result<String, RemoteError> {
        let request = GenerateRequest {
            parts: vec![Part::Text(tip_prompt(mpg_history))],
            config: GenerationConfig {
                temperature: Some(0.7),
                max_output_tokens: Some(100),
                thinking_budget: Some(50),
                ..GenerationConfig::default()
            },
        };
        let text = self.model.generate(request).await?;
        Ok(text.trim().to_string())
    }
}

fn tip_prompt(mpg_history: &[f64]) -> String {
    let values = mpg_history
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "My last few trips had the following miles-per-gallon (MPG) values: {values}. \
         Based on this, provide one concise, actionable tip for improving my car's fuel \
         efficiency. The tip should be easy to understand for a non-expert."
    )
}
