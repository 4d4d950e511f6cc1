use outfit_types::WeatherSnapshot;

/// 构建推荐 prompt：用户问题 + 天气 + 按相似度排序的规则
///
/// 一次性格式化，用户输入中的花括号原样保留。
pub fn build_prompt(
    question: &str,
    preference: &str,
    weather: &WeatherSnapshot,
    rules: &[String],
) -> String {
    format!(
        "User question: {question}\n\n\
         Current weather: {condition}, {min_temp}°C to {max_temp}°C (average {avg_temp}°C)\n\
         Style preference: {preference}\n\n\
         Relevant clothing rules:\n\
         {rules}\n\n\
         Provide a personalized outfit recommendation based on the question, the weather and the rules above. \
         Explain your reasoning in plain natural language as a stylist would, and do not quote the rules verbatim.",
        question = question,
        condition = weather.condition,
        min_temp = format_temp(weather.min_temp),
        max_temp = format_temp(weather.max_temp),
        avg_temp = format_temp(weather.avg_temp),
        preference = preference,
        rules = rules.join("\n"),
    )
}

fn format_temp(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}
