use outfit_types::RuleFilter;

/// 将过滤条件渲染为 LanceDB 的 SQL where 子句
///
/// 过滤下推到存储层执行，近邻计算只在满足条件的记录上进行。
pub fn filter_expression(filter: &RuleFilter) -> String {
    format!(
        "temperature_min <= {} AND temperature_max >= {} AND weather = {} AND preference = {}",
        filter.max_temp,
        filter.min_temp,
        quote(&filter.weather),
        quote(&filter.preference)
    )
}

/// SQL 字符串字面量（单引号转义）
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expression() {
        let filter = RuleFilter {
            max_temp: 8,
            min_temp: 2,
            weather: "cloudy".to_string(),
            preference: "casual".to_string(),
        };

        assert_eq!(
            filter_expression(&filter),
            "temperature_min <= 8 AND temperature_max >= 2 AND weather = 'cloudy' AND preference = 'casual'"
        );
    }

    #[test]
    fn test_filter_expression_escapes_quotes() {
        let filter = RuleFilter {
            max_temp: -1,
            min_temp: -10,
            weather: "snow".to_string(),
            preference: "it's formal".to_string(),
        };

        assert_eq!(
            filter_expression(&filter),
            "temperature_min <= -1 AND temperature_max >= -10 AND weather = 'snow' AND preference = 'it''s formal'"
        );
    }
}
