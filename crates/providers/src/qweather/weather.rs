//! 和风天气（QWeather）3 日预报

use async_trait::async_trait;
use outfit_types::WeatherSnapshot;
use reqwest::Client;
use serde::Deserialize;

use crate::common::build_client;
use crate::config::ProviderConfig;
use crate::error::WeatherError;
use crate::traits::WeatherProvider;

/// 城市名 → 和风天气 location ID
const CITY_IDS: &[(&str, &str)] = &[
    ("Beijing", "101010100"),
    ("Shanghai", "101020100"),
    ("Guangzhou", "101280101"),
    ("Shenzhen", "101280601"),
    ("Hangzhou", "101210101"),
    ("Nanjing", "101190101"),
    ("Wuhan", "101200101"),
    ("Chengdu", "101270101"),
    ("Chongqing", "101040100"),
    ("Xi'an", "101110101"),
];

/// 解析地点：已知城市映射为 ID，未知地点原样传给 API
fn resolve_location(location: &str) -> &str {
    let location = location.trim();
    CITY_IDS
        .iter()
        .find(|(city, _)| city.eq_ignore_ascii_case(location))
        .map(|(_, id)| *id)
        .unwrap_or(location)
}

pub struct QWeatherProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct QWeatherResponse {
    code: String,
    #[serde(default)]
    daily: Vec<QWeatherDaily>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QWeatherDaily {
    temp_max: String,
    temp_min: String,
    text_day: String,
}

impl QWeatherProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, WeatherError> {
        let client = build_client(config.timeout)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn parse_temp(field: &str, value: &str) -> Result<f64, WeatherError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| WeatherError::InvalidResponse(format!("{} '{}': {}", field, value, e)))
}

#[async_trait]
impl WeatherProvider for QWeatherProvider {
    async fn get_weather(&self, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let location_id = resolve_location(location);
        let url = format!("{}/weather/3d", self.base_url);

        tracing::debug!("Fetching weather for {} ({})", location, location_id);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("location", location_id),
                ("key", self.api_key.as_str()),
                ("lang", "en"),
            ])
            .send()
            .await
            .map_err(WeatherError::transport)?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body = response.text().await.map_err(WeatherError::transport)?;
        let weather: QWeatherResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;

        if weather.code != "200" {
            return Err(WeatherError::ApiCode(weather.code));
        }

        let today = weather
            .daily
            .into_iter()
            .next()
            .ok_or(WeatherError::NoDailyData)?;

        let max_temp = parse_temp("tempMax", &today.temp_max)?;
        let min_temp = parse_temp("tempMin", &today.temp_min)?;
        let condition = today.text_day.trim().to_lowercase();

        Ok(WeatherSnapshot::new(min_temp, max_temp, condition))
    }
}

pub fn create(config: &ProviderConfig) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    Ok(Box::new(QWeatherProvider::new(config)?))
}
