//! Plotly figure documents
//!
//! A [`Figure`] serializes to the `{"data": [...], "layout": {...}}` shape Plotly
//! expects, so the JSON can be fed to any Plotly frontend or wrapped into a
//! standalone HTML page with [`Figure::to_html`].

use crate::error::CensusError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

/// Trace type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
    Bar,
    Histogram,
}

/// Single color or one color per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerPoint(Vec<String>),
}

impl From<&str> for Color {
    fn from(color: &str) -> Self {
        Color::Single(color.to_string())
    }
}

impl From<Vec<String>> for Color {
    fn from(colors: Vec<String>) -> Self {
        Color::PerPoint(colors)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

/// Histogram bin width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bins {
    pub size: f64,
}

/// One data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub x: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub y: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbinsx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xbins: Option<Bins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl Trace {
    fn new(kind: TraceKind) -> Self {
        Trace {
            kind,
            name: None,
            x: Vec::new(),
            y: Vec::new(),
            mode: None,
            marker: None,
            nbinsx: None,
            xbins: None,
            showlegend: None,
        }
    }

    /// Marker-only scatter.
    pub fn scatter(x: Vec<Value>, y: Vec<Value>) -> Self {
        Trace {
            x,
            y,
            mode: Some("markers".to_string()),
            ..Trace::new(TraceKind::Scatter)
        }
    }

    pub fn bar(x: Vec<Value>, y: Vec<Value>) -> Self {
        Trace {
            x,
            y,
            ..Trace::new(TraceKind::Bar)
        }
    }

    pub fn histogram(x: Vec<Value>) -> Self {
        Trace {
            x,
            ..Trace::new(TraceKind::Histogram)
        }
    }

    /// Marker-only trace with no points, shown only in the legend.
    pub fn legend_entry(name: &str, color: &str) -> Self {
        Trace::scatter(vec![Value::Null], vec![Value::Null])
            .named(name)
            .with_marker(Marker {
                color: Some(color.into()),
                size: Some(10.0),
                ..Marker::default()
            })
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn hide_legend(mut self) -> Self {
        self.showlegend = Some(false);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticklen: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickwidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickfont: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticksuffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nticks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridwidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linewidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<String>,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Axis {
            title: Some(Title { text: title.to_string() }),
            ..Axis::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bordercolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borderwidth: Option<f64>,
}

/// Shape drawn over the plot area (e.g. a separator line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub x0: Value,
    pub y0: Value,
    pub x1: Value,
    pub y1: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

/// Complete chart: traces plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new() -> Self {
        Figure::default()
    }

    pub fn with_traces(data: Vec<Trace>) -> Self {
        Figure {
            data,
            layout: Layout::default(),
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    pub fn title(&self) -> Option<&str> {
        self.layout.title.as_ref().map(|t| t.text.as_str())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.layout.title = Some(Title { text: title.into() });
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, CensusError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Standalone HTML page rendering the figure with Plotly from its CDN.
    pub fn to_html(&self) -> Result<String, CensusError> {
        let figure = script_safe(&serde_json::to_string(self)?);
        let title = escape_html(self.title().unwrap_or("DAO census"));

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
const figure = {figure};
Plotly.newPlot("chart", figure.data, figure.layout);
</script>
</body>
</html>
"#
        ))
    }

    pub fn write_json(&self, path: &Path) -> Result<(), CensusError> {
        create_parent(path)?;
        fs::write(path, self.to_json()?)?;
        log::info!("Figure written to {}", path.display());
        Ok(())
    }

    pub fn write_html(&self, path: &Path) -> Result<(), CensusError> {
        create_parent(path)?;
        fs::write(path, self.to_html()?)?;
        log::info!("Figure written to {}", path.display());
        Ok(())
    }
}

/// JSON that cannot close the surrounding `<script>` element. The escapes are valid
/// inside JSON strings, so the parsed figure is unchanged.
fn script_safe(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn create_parent(path: &Path) -> Result<(), CensusError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
