//! 天气工具（模拟数据，确定性输出）

use async_trait::async_trait;

use crate::tools::Tool;

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get weather information for a specific location"
    }

    fn input_name(&self) -> Option<&str> {
        Some("location")
    }

    async fn invoke(&self, input: &str) -> String {
        format!("Weather in {input}: Sunny, 22°C. This is a mock response.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_weather_mock_response() {
        assert_eq!(
            WeatherTool.invoke("London").await,
            "Weather in London: Sunny, 22°C. This is a mock response."
        );
    }
}
