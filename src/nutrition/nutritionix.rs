//! Nutritionix natural-language nutrients API.
//!
//! Best-effort enrichment only: callers treat any error as "no data".

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::foods::FoodFact;
use crate::config::NutritionixConfig;

/// Remote source of nutrition facts consulted when the static table misses.
#[async_trait]
pub trait NutritionSource: Send + Sync {
    async fn fetch(&self, query: &str) -> anyhow::Result<Option<FoodFact>>;
}

pub struct NutritionixClient {
    config: NutritionixConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct NutrientsRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct NutrientsResponse {
    #[serde(default)]
    foods: Vec<NutritionixFood>,
}

#[derive(Debug, Deserialize)]
struct NutritionixFood {
    food_name: Option<String>,
    nf_calories: Option<f64>,
    nf_protein: Option<f64>,
    nf_total_carbohydrate: Option<f64>,
    nf_total_fat: Option<f64>,
    nf_dietary_fiber: Option<f64>,
}

impl NutritionixFood {
    fn into_fact(self, query: &str) -> FoodFact {
        FoodFact {
            food_name: self.food_name.unwrap_or_else(|| query.to_string()),
            calories: self.nf_calories.unwrap_or(0.0),
            protein_g: self.nf_protein.unwrap_or(0.0),
            carbs_g: self.nf_total_carbohydrate.unwrap_or(0.0),
            fat_g: self.nf_total_fat.unwrap_or(0.0),
            fiber_g: self.nf_dietary_fiber.unwrap_or(0.0),
            note: None,
        }
    }
}

impl NutritionixClient {
    pub fn new(config: NutritionixConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build nutritionix http client")?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v2/natural/nutrients",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl NutritionSource for NutritionixClient {
    #[instrument(skip(self))]
    async fn fetch(&self, query: &str) -> anyhow::Result<Option<FoodFact>> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-app-id", &self.config.app_id)
            .header("x-app-key", &self.config.api_key)
            .header("x-remote-user-id", "0")
            .json(&NutrientsRequest { query })
            .send()
            .await
            .context("nutritionix request")?
            .error_for_status()
            .context("nutritionix status")?;

        let body: NutrientsResponse = response.json().await.context("nutritionix body")?;
        debug!(results = body.foods.len(), "nutritionix response");
        Ok(body.foods.into_iter().next().map(|f| f.into_fact(query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> NutritionixConfig {
        NutritionixConfig {
            app_id: "id".into(),
            api_key: "key".into(),
            base_url: base_url.into(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = NutritionixClient::new(config("https://example.test/")).unwrap();
        assert_eq!(client.endpoint(), "https://example.test/v2/natural/nutrients");
    }

    #[test]
    fn response_fields_map_to_fact_with_zero_defaults() {
        let body: NutrientsResponse = serde_json::from_str(
            r#"{"foods":[{"food_name":"kimchi","nf_calories":23,"nf_protein":1.7,"nf_total_fat":null}]}"#,
        )
        .unwrap();
        let fact = body.foods.into_iter().next().unwrap().into_fact("kimchi");
        assert_eq!(fact.food_name, "kimchi");
        assert_eq!(fact.calories, 23.0);
        assert_eq!(fact.protein_g, 1.7);
        assert_eq!(fact.carbs_g, 0.0);
        assert_eq!(fact.fat_g, 0.0);
        assert!(!fact.is_approximate());
    }

    #[test]
    fn missing_food_name_uses_query_and_empty_list_is_none() {
        let body: NutrientsResponse = serde_json::from_str(r#"{"foods":[{}]}"#).unwrap();
        let fact = body.foods.into_iter().next().unwrap().into_fact("soup");
        assert_eq!(fact.food_name, "soup");

        let empty: NutrientsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.foods.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error_not_a_panic() {
        let client = NutritionixClient::new(config("http://127.0.0.1:9")).unwrap();
        assert!(client.fetch("apple pie").await.is_err());
    }
}
