use serde_json::{json, Map, Value};

use crate::chart::{Figure, Panel, PanelKind, Ring, Series};
use crate::error::Result;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const GAP: f64 = 0.08;
const HOVER: &str = "<b>%{text}</b><extra></extra>";

fn axis_ids(n: usize) -> (String, String, String, String) {
    if n == 1 {
        ("x".into(), "y".into(), "xaxis".into(), "yaxis".into())
    } else {
        (format!("x{n}"), format!("y{n}"), format!("xaxis{n}"), format!("yaxis{n}"))
    }
}

fn colors_value(colors: &[String], len: usize) -> Value {
    match colors.len() {
        0 => Value::Null,
        1 => json!(colors[0]),
        n => json!((0..len).map(|i| colors[i % n].clone()).collect::<Vec<_>>()),
    }
}

fn series_trace(kind: &str, series: &Series, n: usize) -> Value {
    let (x, y, _, _) = axis_ids(n);
    let mut obj = Map::new();
    obj.insert("name".into(), json!(series.name));
    obj.insert("x".into(), json!(series.labels));
    obj.insert("y".into(), json!(series.values));
    obj.insert("xaxis".into(), json!(x));
    obj.insert("yaxis".into(), json!(y));
    if !series.hover.is_empty() {
        obj.insert("text".into(), json!(series.hover));
        obj.insert("hovertemplate".into(), json!(HOVER));
    }
    let marker_color = colors_value(&series.colors, series.values.len());
    match kind {
        "line" => {
            obj.insert("type".into(), json!("scatter"));
            obj.insert("mode".into(), json!("lines+markers"));
            obj.insert("line".into(), json!({ "color": series.line_color, "width": 3 }));
            obj.insert("marker".into(), json!({ "size": 10, "color": marker_color }));
        }
        "bar" => {
            obj.insert("type".into(), json!("bar"));
            obj.insert("textposition".into(), json!("none"));
            obj.insert("marker".into(), json!({ "color": marker_color }));
        }
        _ => {
            obj.insert("type".into(), json!("scatter"));
            obj.insert("mode".into(), json!("markers"));
            obj.insert("marker".into(), json!({ "size": 10, "color": marker_color }));
        }
    }
    Value::Object(obj)
}

/// Hole fraction and radius scale of ring `k` out of `count`.
pub(crate) fn ring_geometry(k: usize, count: usize) -> (f64, f64) {
    if count <= 1 {
        return (0.4, 1.0);
    }
    let radius = (1.0 - 0.3 * k as f64).max(0.3);
    let hole = ((radius - 0.3) / radius).max(0.15);
    (hole, radius)
}

fn ring_trace(ring: &Ring, k: usize, count: usize, domain: (f64, f64, f64, f64)) -> Value {
    let (x0, x1, y0, y1) = domain;
    let (hole, radius) = ring_geometry(k, count);
    let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let (hw, hh) = ((x1 - x0) / 2.0 * radius, (y1 - y0) / 2.0 * radius);
    let textinfo = if ring.show_labels { "label+percent" } else { "percent" };
    let rotation = 45 * (k as i64 + 1);
    let mut obj = Map::new();
    obj.insert("type".into(), json!("pie"));
    obj.insert("name".into(), json!(ring.name));
    obj.insert("labels".into(), json!(ring.labels));
    obj.insert("values".into(), json!(ring.values));
    obj.insert("hole".into(), json!(hole));
    obj.insert("sort".into(), json!(false));
    obj.insert("direction".into(), json!("clockwise"));
    obj.insert("rotation".into(), json!(rotation));
    obj.insert("textposition".into(), json!("inside"));
    obj.insert("insidetextorientation".into(), json!("horizontal"));
    obj.insert("textinfo".into(), json!(textinfo));
    obj.insert("showlegend".into(), json!(!ring.show_labels));
    obj.insert(
        "marker".into(),
        json!({
            "colors": colors_value(&ring.colors, ring.values.len()),
            "line": { "color": "white", "width": 2 },
        }),
    );
    obj.insert(
        "domain".into(),
        json!({ "x": [cx - hw, cx + hw], "y": [cy - hh, cy + hh] }),
    );
    if !ring.hover.is_empty() {
        obj.insert("text".into(), json!(ring.hover));
        obj.insert("hovertemplate".into(), json!(HOVER));
    }
    Value::Object(obj)
}

fn panel_title(panel: &Panel, domain: (f64, f64, f64, f64)) -> Value {
    let (x0, x1, _, y1) = domain;
    json!({
        "text": format!("<b>{}</b>", panel.title),
        "x": (x0 + x1) / 2.0,
        "y": y1,
        "xref": "paper",
        "yref": "paper",
        "xanchor": "center",
        "yanchor": "bottom",
        "yshift": 10,
        "showarrow": false,
        "font": { "size": 16, "color": "black" },
    })
}

/// Build the Plotly `(data, layout)` pair for a figure.
pub fn plotly_figure(fig: &Figure) -> (Value, Value) {
    let mut data = Vec::new();
    let mut layout = Map::new();
    let mut annotations = Vec::new();
    let mut legend = false;

    for (i, panel) in fig.panels.iter().enumerate() {
        let n = i + 1;
        let domain = panel.cell.domain(fig.rows, fig.cols, GAP);
        annotations.push(panel_title(panel, domain));

        let series = match &panel.kind {
            PanelKind::Line(s) => Some(("line", s)),
            PanelKind::Bar(s) => Some(("bar", s)),
            PanelKind::Scatter(s) => Some(("scatter", s)),
            PanelKind::Donut(rings) => {
                for (k, ring) in rings.iter().enumerate() {
                    legend |= !ring.show_labels;
                    data.push(ring_trace(ring, k, rings.len(), domain));
                }
                None
            }
        };
        let Some((kind, series)) = series else { continue };
        data.push(series_trace(kind, series, n));

        let (x, y, xaxis, yaxis) = axis_ids(n);
        let (x0, x1, y0, y1) = domain;
        let x_title = panel.x_title.as_ref().map(|t| format!("<b>{t}</b>"));
        let y_title = panel.y_title.as_ref().map(|t| format!("<b>{t}</b>"));
        layout.insert(
            xaxis,
            json!({
                "domain": [x0, x1],
                "anchor": y,
                "type": "category",
                "title": { "text": x_title },
            }),
        );
        let mut y_axis = json!({
            "domain": [y0, y1],
            "anchor": x,
            "title": { "text": y_title },
        });
        if let Some((lo, hi)) = panel.y_range {
            y_axis["range"] = json!([lo, hi]);
        }
        layout.insert(yaxis, y_axis);
    }

    for ann in &fig.annotations {
        let Some(panel) = fig.panels.get(ann.panel) else { continue };
        let series = match &panel.kind {
            PanelKind::Line(s) | PanelKind::Bar(s) | PanelKind::Scatter(s) => s,
            PanelKind::Donut(_) => continue,
        };
        let (Some(label), Some(value)) = (series.labels.get(ann.point), series.values.get(ann.point)) else {
            continue;
        };
        let (x, y, _, _) = axis_ids(ann.panel + 1);
        annotations.push(json!({
            "x": label,
            "y": value,
            "xref": x,
            "yref": y,
            "text": format!("<b>{}</b>", ann.text),
            "font": { "size": 10 },
            "showarrow": true,
            "arrowhead": 2,
            "arrowsize": 1,
            "arrowwidth": 1.5,
            "arrowcolor": ann.color,
            "ax": -80,
            "ay": -20,
        }));
    }

    let mut bottom = 80;
    if let Some(summary) = &fig.summary {
        bottom += 40 + 18 * summary.lines().count() as i64;
        let text = summary.lines().collect::<Vec<_>>().join("<br>");
        annotations.push(json!({
            "text": text,
            "x": 0.0,
            "y": -0.12,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "left",
            "yanchor": "top",
            "align": "left",
            "showarrow": false,
            "bgcolor": "#f9f9f9",
            "bordercolor": "#cccccc",
            "borderpad": 8,
            "font": { "size": 13, "color": "#333333" },
        }));
    }
    if let Some(footer) = &fig.footer {
        annotations.push(json!({
            "text": format!("<b>{footer}</b>"),
            "x": 0.5,
            "y": 0.0,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "center",
            "yanchor": "top",
            "yshift": -(bottom as f64 - 30.0),
            "showarrow": false,
            "font": { "size": 12, "color": "gray" },
        }));
    }

    layout.insert(
        "title".into(),
        json!({
            "text": format!("<b>{}</b>", fig.title),
            "x": 0.5,
            "y": 0.97,
            "font": { "size": 24, "color": "black" },
        }),
    );
    layout.insert("showlegend".into(), json!(legend));
    layout.insert("width".into(), json!(fig.width));
    layout.insert("height".into(), json!(fig.height + bottom as u32));
    layout.insert(
        "margin".into(),
        json!({ "l": 100, "r": 100, "t": 120, "b": bottom }),
    );
    layout.insert("font".into(), json!({ "size": 12, "family": "Arial Black" }));
    layout.insert("annotations".into(), Value::Array(annotations));

    (Value::Array(data), Value::Object(layout))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON is embedded in a `<script>` block, so `</` must not appear verbatim.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub fn render_html(fig: &Figure) -> Result<String> {
    let (data, layout) = plotly_figure(fig);
    let data = escape_script(&serde_json::to_string(&data)?);
    let layout = escape_script(&serde_json::to_string(&layout)?);
    let title = escape_html(&fig.title);
    Ok(format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>{title}</title>
<script src=\"{PLOTLY_JS}\" charset=\"utf-8\"></script>
</head>
<body>
<div id=\"dashboard\"></div>
<script>
Plotly.newPlot(\"dashboard\", {data}, {layout}, {{\"responsive\": true}});
</script>
</body>
</html>
"
    ))
}
