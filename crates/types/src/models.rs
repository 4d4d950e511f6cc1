use serde::{Deserialize, Serialize};

/// 未指定风格偏好时使用的默认值
pub const DEFAULT_PREFERENCE: &str = "casual";

/// 静态穿衣规则（来自规则文件，加载后不再修改）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingRule {
    pub temperature_min: i32,
    pub temperature_max: i32,
    pub weather: String,
    #[serde(default)]
    pub schedule: String,
    pub preference: String,
    pub outfit: String,
}

impl ClothingRule {
    /// 渲染为用于语义检索的自然语言描述
    pub fn describe(&self) -> String {
        let schedule = if self.schedule.trim().is_empty() {
            String::new()
        } else {
            format!(", schedule {}", self.schedule.trim())
        };

        format!(
            "Temperature {}-{}°C, weather {}{}, preference {}: {}",
            self.temperature_min,
            self.temperature_max,
            self.weather,
            schedule,
            self.preference,
            self.outfit
        )
    }

    /// 结构化字段，作为向量记录上可过滤的属性
    pub fn attributes(&self) -> RuleAttributes {
        RuleAttributes {
            temperature_min: self.temperature_min,
            temperature_max: self.temperature_max,
            weather: self.weather.clone(),
            preference: self.preference.clone(),
            outfit: self.outfit.clone(),
        }
    }
}

/// 规则文件：`{"rules": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<ClothingRule>,
}

impl RuleSet {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 向量记录上的数值/类别属性
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAttributes {
    pub temperature_min: i32,
    pub temperature_max: i32,
    pub weather: String,
    pub preference: String,
    pub outfit: String,
}

/// 待插入的记录（id 由存储分配）
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub text: String,
    pub vector: Vec<f32>,
    pub attributes: RuleAttributes,
}

/// 检索过滤条件
///
/// 记录的温度区间必须与查询的温度区间相交，类别属性必须精确相等：
/// `temperature_min <= max_temp AND temperature_max >= min_temp
///  AND weather = condition AND preference = preference`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFilter {
    pub max_temp: i32,
    pub min_temp: i32,
    pub weather: String,
    pub preference: String,
}

impl RuleFilter {
    /// 根据天气快照构建过滤条件
    ///
    /// 规则温度为整数，因此上界向下取整、下界向上取整后比较结果不变。
    pub fn for_weather(weather: &WeatherSnapshot, preference: &str) -> Self {
        Self {
            max_temp: weather.max_temp.floor() as i32,
            min_temp: weather.min_temp.ceil() as i32,
            weather: weather.condition.clone(),
            preference: preference.to_string(),
        }
    }

    /// 判断属性是否满足过滤条件
    pub fn matches(&self, attributes: &RuleAttributes) -> bool {
        attributes.temperature_min <= self.max_temp
            && attributes.temperature_max >= self.min_temp
            && attributes.weather == self.weather
            && attributes.preference == self.preference
    }
}

/// 单次请求获取的天气（不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub avg_temp: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub condition: String,
}

impl WeatherSnapshot {
    pub fn new(min_temp: f64, max_temp: f64, condition: impl Into<String>) -> Self {
        Self {
            avg_temp: (max_temp + min_temp) / 2.0,
            max_temp,
            min_temp,
            condition: condition.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_input: String,
    pub preference: String,
    pub location: String,
}

impl RecommendationRequest {
    pub fn new(
        user_input: impl Into<String>,
        preference: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            preference: preference.into(),
            location: location.into(),
        }
    }

    /// 实际使用的风格偏好（为空时回退到 "casual"）
    pub fn effective_preference(&self) -> &str {
        let pref = self.preference.trim();
        if pref.is_empty() {
            DEFAULT_PREFERENCE
        } else {
            pref
        }
    }
}

/// 推荐结果
///
/// `text` 为 LLM 原样输出；`weather` 与 `rules` 记录生成时实际使用的上下文。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub text: String,
    pub weather: WeatherSnapshot,
    pub rules: Vec<String>,
}
