use console::Style;
use std::io::{self, Write};
use std::path::Path;

use outfit_types::WeatherSnapshot;

/// 命令行输出格式化工具
/// 状态行写到 stderr，推荐结果写到 stdout
pub struct Output {
    green: Style,
    dim: Style,
}

impl Output {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            dim: Style::new().dim(),
        }
    }

    /// 显示状态消息
    /// 格式: "   Ingesting 12 rules from data/clothing_rules.json"（动词右对齐到 12 字符）
    pub fn status(&self, action: &str, target: &str) {
        eprintln!("{:>12} {}", self.green.apply_to(action), target);
    }

    /// 开始执行操作的状态消息（会在前面自动添加空行）
    pub fn begin_operation(&self, action: &str, target: &str) {
        eprintln!();
        self.status(action, target);
    }

    /// 显示向量库信息
    /// 格式: "    Database /path/to/store (12 records, bge-base-zh/768d)"
    pub fn database_info(&self, path: &Path, record_count: usize, model: &str, dimension: usize) {
        eprintln!(
            "{:>12} {} {}",
            self.green.apply_to("Database"),
            path.display(),
            self.dim.apply_to(format!(
                "({} records, {}/{}d)",
                record_count, model, dimension
            ))
        );
    }

    /// 显示创建/查找资源消息
    /// 格式: "    Creating config at /path/to/config"
    pub fn resource_action(&self, action: &str, resource: &str, path: &Path) {
        eprintln!(
            "{:>12} {} at {}",
            self.green.apply_to(action),
            resource,
            path.display()
        );
    }

    /// 显示本次推荐使用的天气
    pub fn weather(&self, weather: &WeatherSnapshot) {
        eprintln!(
            "{:>12} {} {}",
            self.green.apply_to("Weather"),
            weather.condition,
            self.dim.apply_to(format!(
                "({}°C ~ {}°C, avg {}°C)",
                weather.min_temp, weather.max_temp, weather.avg_temp
            ))
        );
    }

    /// 推荐正文（标准输出）
    pub fn recommendation(&self, text: &str) {
        println!();
        println!("{}", text.trim_end());
    }

    /// 显示完成消息
    /// 格式: "    Finished action"
    pub fn finish(&self, action: &str) {
        eprintln!();
        eprintln!("{:>12} {}", self.green.apply_to("Finished"), action);
    }

    /// 显示统计信息
    /// 格式: "             12 inserted, 0 failed"
    pub fn stats(&self, items: &[(&str, usize)]) {
        let parts: Vec<String> = items
            .iter()
            .map(|(name, count)| format!("{} {}", count, name))
            .collect();
        eprintln!("{:>12} {}", "", self.dim.apply_to(parts.join(", ")));
    }

    /// 显示注意事项（右对齐）
    pub fn note(&self, message: &str) {
        eprintln!("{:>12} {}", self.dim.apply_to("Note"), message);
    }

    /// 显示警告（黄色，右对齐）
    pub fn warning(&self, message: &str) {
        eprintln!();
        eprintln!(
            "{:>12} {}",
            Style::new().yellow().bold().apply_to("Warning"),
            message
        );
    }

    /// 显示错误（红色，标准输出）
    pub fn error(&self, message: &str) {
        println!(
            "{:>12} {}",
            Style::new().red().bold().apply_to("Error"),
            message
        );
    }

    /// 显示提示消息（右对齐）
    pub fn info(&self, message: &str) {
        eprintln!("{:>12} {}", "", message);
    }

    /// 显示确认提示并读取用户输入
    /// 返回用户是否输入了 `expected`
    pub fn confirm(&self, expected: &str) -> io::Result<bool> {
        eprintln!();
        eprint!(
            "{:>12} Type {} to confirm: ",
            "",
            Style::new().green().bold().apply_to(expected)
        );
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        Ok(input.trim() == expected)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
