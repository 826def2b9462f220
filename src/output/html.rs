use super::*;
use anyhow::Result;
use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "src/output/templates/"]
#[include = "*.html"]
struct Templates;

#[derive(RustEmbed)]
#[folder = "src/output/assets/"]
#[include = "*.css"]
#[include = "*.js"]
struct Assets;

pub struct HtmlGenerator {
    tera: Tera,
}

impl HtmlGenerator {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Load templates from embedded resources
        for file in Templates::iter() {
            let template_name = file.as_ref();
            let template_content = Templates::get(template_name)
                .ok_or_else(|| anyhow::anyhow!("Template {} not found", template_name))?;
            let template_str = std::str::from_utf8(&template_content.data)
                .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in template {}: {}", template_name, e))?;

            tera.add_raw_template(template_name, template_str)
                .map_err(|e| anyhow::anyhow!("Failed to add template {}: {}", template_name, e))?;
        }

        tera.register_filter("days", Self::days_filter);
        tera.register_filter("latency_class", Self::latency_class_filter);

        Ok(Self { tera })
    }

    fn load_asset(&self, filename: &str) -> Result<String> {
        let asset = Assets::get(filename)
            .ok_or_else(|| anyhow::anyhow!("Asset {} not found", filename))?;
        let content = std::str::from_utf8(&asset.data)
            .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in asset {}: {}", filename, e))?;
        Ok(content.to_string())
    }

    fn days_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let text = match value.as_f64() {
            Some(days) if (days - 1.0).abs() < f64::EPSILON => "1 day".to_string(),
            Some(days) => format!("{:.1} days", days),
            None => "n/a".to_string(),
        };
        Ok(Value::String(text))
    }

    fn latency_class_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let days = value.as_f64().unwrap_or(0.0);
        let class = if days >= 30.0 {
            "latency-slow"
        } else if days >= 7.0 {
            "latency-medium"
        } else {
            "latency-fast"
        };
        Ok(Value::String(class.to_string()))
    }

    /// Chart data embedded in a `<script>` element.
    fn charts_json(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string(&report.charts)?.replace("</", "<\\/"))
    }

    fn prepare_template_context(&self, report: &Report) -> Result<Context> {
        let mut context = Context::new();

        context.insert("css_content", &self.load_asset("styles.css")?);
        context.insert("js_content", &self.load_asset("charts.js")?);
        context.insert("charts_json", &self.charts_json(report)?);

        context.insert("project", &report.project);
        context.insert("owners", &report.owners);
        context.insert(
            "generated_date",
            &report.generated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert("summary", &report.summary);
        context.insert("charts", &report.charts);

        Ok(context)
    }
}

impl OutputGenerator for HtmlGenerator {
    async fn generate(&mut self, report: &Report) -> Result<String> {
        let context = self.prepare_template_context(report)?;
        let html = self.tera.render("report.html", &context)?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::{context, sample_set};
    use crate::charts::trend;
    use serde_json::json;

    #[test]
    fn days_filter_formats() {
        let args = HashMap::new();
        assert_eq!(HtmlGenerator::days_filter(&json!(1.0), &args).unwrap(), json!("1 day"));
        assert_eq!(HtmlGenerator::days_filter(&json!(12.345), &args).unwrap(), json!("12.3 days"));
        assert_eq!(HtmlGenerator::days_filter(&Value::Null, &args).unwrap(), json!("n/a"));
    }

    #[test]
    fn latency_classes() {
        let args = HashMap::new();
        assert_eq!(
            HtmlGenerator::latency_class_filter(&json!(45), &args).unwrap(),
            json!("latency-slow")
        );
        assert_eq!(
            HtmlGenerator::latency_class_filter(&json!(2.5), &args).unwrap(),
            json!("latency-fast")
        );
    }

    #[tokio::test]
    async fn renders_every_chart_window() {
        let set = sample_set();
        let ctx = context(&["alice"]);
        let report = Report::new(&ctx, &set, vec![trend::time_to_merge(&set, &ctx)]);

        let html = HtmlGenerator::new().unwrap().generate(&report).await.unwrap();
        assert!(html.contains("id=\"chart-time-to-merge\""));
        assert!(html.contains("Time to merge - alice - openstack_neutron"));
        assert!(html.contains("Moving mean of the last 9 patches"));
        assert!(html.contains("120"));
    }

    #[test]
    fn script_payload_cannot_close_tag() {
        let set = sample_set();
        let ctx = context(&[]);
        let mut chart = trend::time_to_merge(&set, &ctx);
        chart.title = "</script><script>alert(1)".to_string();
        let report = Report::new(&ctx, &set, vec![chart]);
        let generator = HtmlGenerator::new().unwrap();
        assert!(!generator.charts_json(&report).unwrap().contains("</script>"));
    }
}
