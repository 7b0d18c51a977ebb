//! Server-side HTML for the single page: form, outcome notice and map.

use crate::form::{FormField, FORM_FIELDS};
use crate::map::MapView;
use crate::models::{PatientRecord, PredictionResult, Severity};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const AWESOME_MARKERS_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css";
const AWESOME_MARKERS_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js";
const GLYPHICONS_CSS: &str =
    "https://netdna.bootstrapcdn.com/bootstrap/3.0.0/css/bootstrap-glyphicons.css";

/// What to show between the form and the map.
#[derive(Debug, Clone)]
pub enum Notice {
    Prediction(PredictionResult),
    Error(String),
}

/// Where the form inputs take their values from.
#[derive(Debug, Clone, Copy)]
pub enum FormValues<'a> {
    Record(&'a PatientRecord),
    /// Raw `(name, value)` pairs of a rejected submission, shown as typed.
    Submitted(&'a [(String, String)]),
}

impl FormValues<'_> {
    /// Value attribute for one input, already escaped.
    fn display(&self, field: &FormField) -> String {
        match self {
            FormValues::Record(record) => field.format_value(record.value(field.column)),
            FormValues::Submitted(pairs) => pairs
                .iter()
                .rev()
                .find(|(name, _)| name == field.name())
                .map(|(_, value)| escape_html(value.trim()))
                .unwrap_or_else(|| field.format_value(0.0)),
        }
    }
}

pub struct Page<'a> {
    pub values: FormValues<'a>,
    pub notice: Option<&'a Notice>,
    pub map: &'a MapView,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_page(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Diabetes Prediction</title>
<link rel="stylesheet" href="{LEAFLET_CSS}">
<link rel="stylesheet" href="{AWESOME_MARKERS_CSS}">
<link rel="stylesheet" href="{GLYPHICONS_CSS}">
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<main>
<h1>💉 Diabetes Prediction</h1>
<p>Enter the patient's measurements to estimate the likelihood of diabetes with a gradient boosted tree model.</p>
<h2>Patient data</h2>
"#
    ));
    html.push_str(&render_form(&page.values));
    if let Some(notice) = page.notice {
        html.push_str(&render_notice(notice));
    }
    html.push_str(&render_map(page.map));
    html.push_str(&format!(
        r#"<hr>
<footer>Built with Rust, actix-web and XGBoost</footer>
</main>
<script src="{LEAFLET_JS}"></script>
<script src="{AWESOME_MARKERS_JS}"></script>
<script>
(function () {{
  var view = JSON.parse(document.getElementById("map-data").textContent);
  var map = L.map("hospital-map").setView(view.center, view.zoom);
  L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
    attribution: "&copy; OpenStreetMap contributors"
  }}).addTo(map);
  view.markers.forEach(function (marker) {{
    var icon = L.AwesomeMarkers.icon({{
      icon: marker.style.icon,
      markerColor: marker.style.color,
      prefix: "glyphicon"
    }});
    L.marker(marker.location, {{ icon: icon }}).bindPopup(marker.popup).addTo(map);
  }});
}})();
</script>
</body>
</html>
"#
    ));
    html
}

fn render_form(values: &FormValues<'_>) -> String {
    let mut html = String::from("<form method=\"post\" action=\"/\" class=\"patient-form\">\n");
    for column in FORM_FIELDS.chunks(4) {
        html.push_str("<div class=\"form-column\">\n");
        for field in column {
            html.push_str(&render_input(field, &values.display(field)));
        }
        html.push_str("</div>\n");
    }
    html.push_str("<button type=\"submit\" name=\"predict\">Predict</button>\n</form>\n");
    html
}

fn render_input(field: &FormField, value: &str) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" step=\"{step}\" value=\"{value}\">\n",
        name = field.name(),
        label = escape_html(field.label),
        min = field.format_value(field.min),
        step = field.step(),
    )
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Prediction(result) => {
            let (class, icon) = match result.severity {
                Severity::Warning => ("warning", "⚠️"),
                Severity::Success => ("success", "✅"),
            };
            format!(
                "<h3>Prediction result</h3>\n<div class=\"notice {class}\" data-label=\"{label}\">{icon} {message}</div>\n",
                label = result.label,
                message = escape_html(&result.message),
            )
        }
        Notice::Error(message) => format!(
            "<h3>Prediction result</h3>\n<div class=\"notice error\">{}</div>\n",
            escape_html(message)
        ),
    }
}

fn render_map(map: &MapView) -> String {
    // Only "</" could end the script element early.
    let data = serde_json::to_string(map)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    format!(
        "<h2>🗺️ Diabetes hospital locations</h2>\n\
         <div id=\"hospital-map\" style=\"width: {width}px; height: {height}px\"></div>\n\
         <script type=\"application/json\" id=\"map-data\">{data}</script>\n",
        width = map.width,
        height = map.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::hospital_map;
    use diabetes_inferences::ModelOutput;

    fn page_with(notice: Option<&Notice>) -> String {
        render_page(&Page {
            values: FormValues::Record(&PatientRecord::default()),
            notice,
            map: &hospital_map(),
        })
    }

    #[test]
    fn default_page_has_eight_zeroed_inputs_and_the_map() {
        let html = page_with(None);
        assert_eq!(html.matches("<input type=\"number\"").count(), 8);
        assert!(html.contains("name=\"BMI\" min=\"0.00\" step=\"0.01\" value=\"0.00\""));
        assert!(html.contains("name=\"DiabetesPedigreeFunction\" min=\"0.000\" step=\"0.001\" value=\"0.000\""));
        assert!(html.contains("name=\"Age\" min=\"0\" step=\"1\" value=\"0\""));
        assert!(html.contains("id=\"hospital-map\""));
        assert!(html.contains("RSUP Dr. Kariadi Semarang"));
        assert!(!html.contains("class=\"notice"));
    }

    #[test]
    fn inputs_appear_in_column_order() {
        let html = page_with(None);
        let positions: Vec<usize> = FORM_FIELDS
            .iter()
            .map(|field| html.find(&format!("name=\"{}\"", field.name())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn warning_notice_for_positive_label() {
        let notice = Notice::Prediction(PredictionResult::new(ModelOutput {
            label: 1,
            probability: 0.8,
        }));
        let html = page_with(Some(&notice));
        assert!(html.contains("class=\"notice warning\" data-label=\"1\""));
        assert!(html.contains("Patient is potentially diabetic (Probability: 80.00%)"));
        assert!(html.contains("id=\"hospital-map\""));
    }

    #[test]
    fn error_notice_is_escaped() {
        let notice = Notice::Error("<script>alert(1)</script>".to_string());
        let html = page_with(Some(&notice));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
    }

    #[test]
    fn submitted_values_are_shown_as_typed() {
        let pairs = vec![
            ("Glucose".to_string(), "150".to_string()),
            ("Age".to_string(), " -3 ".to_string()),
            ("BMI".to_string(), "\"><b>".to_string()),
        ];
        let html = render_page(&Page {
            values: FormValues::Submitted(&pairs),
            notice: None,
            map: &hospital_map(),
        });
        assert!(html.contains("name=\"Glucose\" min=\"0\" step=\"1\" value=\"150\""));
        assert!(html.contains("name=\"Age\" min=\"0\" step=\"1\" value=\"-3\""));
        assert!(html.contains("value=\"&quot;&gt;&lt;b&gt;\""));
        assert!(html.contains("name=\"Insulin\" min=\"0\" step=\"1\" value=\"0\""));
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"a<b>&"c"'d'"#),
            "a&lt;b&gt;&amp;&quot;c&quot;&#39;d&#39;"
        );
    }
}
