use std::f32::consts::{FRAC_PI_2, TAU};
use std::io::BufWriter;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use crate::chart::{Figure, Panel, PanelKind, Ring, Series};
use crate::error::{Result, VizError};
use crate::render::html::ring_geometry;

// A3 landscape (mm)
const PAGE_W: f32 = 420.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TITLE_H: f32 = 22.0;
const FOOTER_H: f32 = 10.0;
const SUMMARY_LINE_H: f32 = 5.5;
const CELL_GAP: f32 = 10.0;
const TITLE_SIZE: f32 = 20.0;
const PANEL_TITLE_SIZE: f32 = 12.0;
const LABEL_SIZE: f32 = 7.0;
const TEXT_SIZE: f32 = 10.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

/// Builtin PDF fonts only cover Latin-1; swap out what they cannot draw.
fn pdf_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{20a6}' => out.push_str("NGN "),
            '\u{20ac}' => out.push_str("EUR "),
            c if (c as u32) < 0x100 => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Parse the colour strings used in figures: `#rrggbb`, `rgb(r, g, b)` or a few names.
pub fn parse_color(color: &str) -> (u8, u8, u8) {
    let c = color.trim().to_ascii_lowercase();
    if let Some(hex) = c.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |i: usize| hex.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok());
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return (r, g, b);
            }
        }
    }
    if let Some(inner) = c.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
        let parts: Vec<u8> = inner.split(',').filter_map(|p| p.trim().parse().ok()).collect();
        if let [r, g, b] = parts[..] {
            return (r, g, b);
        }
    }
    match c.as_str() {
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "tab:blue" => (31, 119, 180),
        "tab:orange" => (255, 127, 14),
        _ => (128, 128, 128),
    }
}

fn color(c: &str) -> Color {
    let (r, g, b) = parse_color(c);
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

/// Readable tick text: 12000 -> "12k", 7.5 -> "7.5".
fn tick_label(v: f32) -> String {
    let abs = v.abs();
    let s = if abs >= 1000.0 {
        format!("{:.1}k", v / 1000.0)
    } else if abs >= 10.0 || v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    };
    s.replace(".0k", "k")
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let cut: String = label.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}.")
    }
}

/// Panel rectangle in top-down page coordinates.
#[derive(Clone, Copy)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(pdf_text(title), Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| VizError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| VizError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            page,
            layer,
        })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    fn point(x: f32, y: f32) -> (Point, bool) {
        (Point::new(Mm(x), Mm(PAGE_H - y)), false)
    }

    fn text(&self, s: &str, x: f32, y: f32, size: f32, bold: bool, fill: &str) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self.layer();
        layer.set_fill_color(color(fill));
        layer.use_text(pdf_text(s), size, Mm(x), Mm(PAGE_H - y), font);
    }

    fn text_centered(&self, s: &str, cx: f32, y: f32, size: f32, bold: bool, fill: &str) {
        let w = approx_text_width(&pdf_text(s), size);
        self.text(s, cx - w / 2.0, y, size, bold, fill);
    }

    fn line(&self, points: &[(f32, f32)], stroke: &str, thickness: f32) {
        let layer = self.layer();
        layer.set_outline_color(color(stroke));
        layer.set_outline_thickness(thickness);
        layer.add_line(Line {
            points: points.iter().map(|&(x, y)| Self::point(x, y)).collect(),
            is_closed: false,
        });
    }

    fn polygon(&self, points: Vec<(f32, f32)>, fill: &str, stroke: Option<&str>) {
        let layer = self.layer();
        layer.set_fill_color(color(fill));
        let mode = match stroke {
            Some(s) => {
                layer.set_outline_color(color(s));
                layer.set_outline_thickness(0.5);
                PaintMode::FillStroke
            }
            None => PaintMode::Fill,
        };
        layer.add_polygon(Polygon {
            rings: vec![points.into_iter().map(|(x, y)| Self::point(x, y)).collect()],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn rect(&self, r: Rect, fill: &str, stroke: Option<&str>) {
        self.polygon(
            vec![(r.x, r.y), (r.x + r.w, r.y), (r.x + r.w, r.y + r.h), (r.x, r.y + r.h)],
            fill,
            stroke,
        );
    }

    /// Annular slice between angles `a0..a1` (radians, clockwise from 12 o'clock).
    fn slice(&self, cx: f32, cy: f32, r_out: f32, r_in: f32, a0: f32, a1: f32, fill: &str) {
        let steps = (((a1 - a0) / TAU) * 72.0).ceil().max(2.0) as usize;
        let at = |r: f32, a: f32| (cx + r * (a - FRAC_PI_2).cos(), cy + r * (a - FRAC_PI_2).sin());
        let mut pts = Vec::with_capacity(steps * 2 + 2);
        for i in 0..=steps {
            pts.push(at(r_out, a0 + (a1 - a0) * i as f32 / steps as f32));
        }
        for i in (0..=steps).rev() {
            pts.push(at(r_in, a0 + (a1 - a0) * i as f32 / steps as f32));
        }
        self.polygon(pts, fill, Some("white"));
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| VizError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| VizError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn value_range(panel: &Panel, values: &[f64]) -> (f32, f32) {
    if let Some((lo, hi)) = panel.y_range {
        if hi > lo {
            return (lo as f32, hi as f32);
        }
    }
    let lo = values.iter().copied().fold(0.0_f64, f64::min) as f32;
    let hi = values.iter().copied().fold(0.0_f64, f64::max) as f32;
    let pad = (hi - lo) * 0.1;
    if hi - lo <= f32::EPSILON {
        (lo, lo + 1.0)
    } else {
        (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
    }
}

/// Draw an x/y panel and return the page position of each point.
fn draw_series(pdf: &PdfWriter, panel: &Panel, series: &Series, area: Rect) -> Vec<(f32, f32)> {
    let plot = Rect {
        x: area.x + 16.0,
        y: area.y + 10.0,
        w: (area.w - 20.0).max(1.0),
        h: (area.h - 26.0).max(1.0),
    };
    let (lo, hi) = value_range(panel, &series.values);
    let to_y = |v: f32| plot.y + plot.h - (v.clamp(lo, hi) - lo) / (hi - lo) * plot.h;
    let baseline = to_y(0.0_f32.clamp(lo, hi));

    for i in 0..=4 {
        let v = lo + (hi - lo) * i as f32 / 4.0;
        let y = to_y(v);
        pdf.line(&[(plot.x, y), (plot.x + plot.w, y)], "#e5e5e5", 0.3);
        let label = tick_label(v);
        let w = approx_text_width(&label, LABEL_SIZE);
        pdf.text(&label, plot.x - w - 2.0, y + 1.0, LABEL_SIZE, false, "#555555");
    }
    pdf.line(&[(plot.x, plot.y), (plot.x, plot.y + plot.h)], "black", 0.5);
    pdf.line(&[(plot.x, baseline), (plot.x + plot.w, baseline)], "black", 0.5);

    let n = series.values.len().max(1);
    let slot = plot.w / n as f32;
    let points: Vec<(f32, f32)> = series
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (plot.x + slot * (i as f32 + 0.5), to_y(*v as f32)))
        .collect();

    match &panel.kind {
        PanelKind::Bar(_) => {
            for (i, &(cx, y)) in points.iter().enumerate() {
                let w = slot * 0.6;
                let (top, bottom) = if y < baseline { (y, baseline) } else { (baseline, y) };
                let fill = series.color_at(i).unwrap_or("#1f77b4");
                pdf.rect(Rect { x: cx - w / 2.0, y: top, w, h: bottom - top }, fill, None);
            }
        }
        PanelKind::Line(_) => {
            let stroke = series.line_color.as_deref().unwrap_or("#1f77b4");
            pdf.line(&points, stroke, 1.5);
            draw_markers(pdf, series, &points);
        }
        _ => draw_markers(pdf, series, &points),
    }

    for (label, &(cx, _)) in series.labels.iter().zip(&points) {
        pdf.text_centered(&truncate(label, 14), cx, plot.y + plot.h + 5.0, LABEL_SIZE, false, "black");
    }
    if let Some(t) = &panel.x_title {
        pdf.text_centered(t, plot.x + plot.w / 2.0, plot.y + plot.h + 12.0, LABEL_SIZE + 1.0, true, "black");
    }
    if let Some(t) = &panel.y_title {
        pdf.text(t, area.x, area.y + 7.0, LABEL_SIZE + 1.0, true, "black");
    }
    points
}

fn draw_markers(pdf: &PdfWriter, series: &Series, points: &[(f32, f32)]) {
    for (i, &(x, y)) in points.iter().enumerate() {
        let fill = series.color_at(i).unwrap_or("#1f77b4");
        pdf.rect(Rect { x: x - 1.2, y: y - 1.2, w: 2.4, h: 2.4 }, fill, None);
    }
}

fn draw_donut(pdf: &PdfWriter, rings: &[Ring], area: Rect) {
    let legend_rings: Vec<&Ring> = rings.iter().filter(|r| !r.show_labels).collect();
    let legend_h = legend_rings
        .iter()
        .map(|r| r.labels.len() as f32 * 5.0 + 6.0)
        .sum::<f32>();
    let body_h = (area.h - 8.0 - legend_h).max(area.h * 0.5);
    let radius = (area.w.min(body_h) / 2.0) * 0.9;
    let (cx, cy) = (area.x + area.w / 2.0, area.y + 8.0 + body_h / 2.0);

    for (k, ring) in rings.iter().enumerate() {
        let (hole, scale) = ring_geometry(k, rings.len());
        let r_out = radius * scale as f32;
        let r_in = r_out * hole as f32;
        let total = ring.total() as f32;
        if total <= 0.0 {
            continue;
        }
        let mut a = 0.0_f32;
        for (i, v) in ring.values.iter().enumerate() {
            let v = *v as f32;
            if v <= 0.0 {
                continue;
            }
            let sweep = v / total * TAU;
            let fill = ring.colors.get(i % ring.colors.len().max(1)).map(String::as_str).unwrap_or("#1f77b4");
            pdf.slice(cx, cy, r_out, r_in, a, a + sweep, fill);
            let mid = a + sweep / 2.0 - FRAC_PI_2;
            let r_mid = (r_out + r_in) / 2.0;
            let (tx, ty) = (cx + r_mid * mid.cos(), cy + r_mid * mid.sin());
            let pct = format!("{:.1}%", v / total * 100.0);
            pdf.text_centered(&pct, tx, ty + 1.0, LABEL_SIZE, true, "white");
            if ring.show_labels {
                if let Some(label) = ring.labels.get(i) {
                    let r_lab = r_out + 5.0;
                    pdf.text_centered(label, cx + r_lab * mid.cos(), cy + r_lab * mid.sin() + 1.0, LABEL_SIZE + 1.0, true, "black");
                }
            }
            a += sweep;
        }
    }

    let mut y = area.y + 8.0 + body_h + 4.0;
    for ring in legend_rings {
        pdf.text(&ring.name, area.x + 4.0, y, LABEL_SIZE + 1.0, true, "black");
        y += 5.0;
        for (i, label) in ring.labels.iter().enumerate() {
            let fill = ring.colors.get(i % ring.colors.len().max(1)).map(String::as_str).unwrap_or("#1f77b4");
            pdf.rect(Rect { x: area.x + 4.0, y: y - 3.0, w: 3.0, h: 3.0 }, fill, None);
            pdf.text(label, area.x + 9.0, y, LABEL_SIZE + 1.0, false, "black");
            y += 5.0;
        }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

pub fn render_pdf(fig: &Figure) -> Result<Vec<u8>> {
    let pdf = PdfWriter::new(&fig.title)?;
    pdf.text_centered(&fig.title, PAGE_W / 2.0, MARGIN + 8.0, TITLE_SIZE, true, "black");

    let summary_lines: Vec<&str> = fig.summary.as_deref().map(|s| s.lines().collect()).unwrap_or_default();
    let summary_h = if summary_lines.is_empty() {
        0.0
    } else {
        summary_lines.len() as f32 * SUMMARY_LINE_H + 8.0
    };
    let footer_h = if fig.footer.is_some() { FOOTER_H } else { 0.0 };

    let grid = Rect {
        x: MARGIN,
        y: MARGIN + TITLE_H,
        w: PAGE_W - 2.0 * MARGIN,
        h: PAGE_H - 2.0 * MARGIN - TITLE_H - summary_h - footer_h,
    };

    let mut positions: Vec<Vec<(f32, f32)>> = Vec::with_capacity(fig.panels.len());
    for panel in &fig.panels {
        let (x0, x1, y0, y1) = panel.cell.domain(fig.rows, fig.cols, 0.0);
        let area = Rect {
            x: grid.x + x0 as f32 * grid.w + CELL_GAP / 2.0,
            y: grid.y + (1.0 - y1 as f32) * grid.h + CELL_GAP / 2.0,
            w: (x1 - x0) as f32 * grid.w - CELL_GAP,
            h: (y1 - y0) as f32 * grid.h - CELL_GAP,
        };
        pdf.text_centered(&panel.title, area.x + area.w / 2.0, area.y + 3.0, PANEL_TITLE_SIZE, true, "black");
        let body = Rect { y: area.y + 5.0, h: area.h - 5.0, ..area };
        let points = match &panel.kind {
            PanelKind::Line(s) | PanelKind::Bar(s) | PanelKind::Scatter(s) => draw_series(&pdf, panel, s, body),
            PanelKind::Donut(rings) => {
                draw_donut(&pdf, rings, body);
                Vec::new()
            }
        };
        positions.push(points);
    }

    for ann in &fig.annotations {
        let Some(&(px, py)) = positions.get(ann.panel).and_then(|p| p.get(ann.point)) else {
            continue;
        };
        let (tx, ty) = (px - 30.0, py - 8.0);
        pdf.line(&[(tx + 2.0, ty + 1.0), (px, py)], &ann.color, 0.8);
        let w = approx_text_width(&ann.text, LABEL_SIZE + 1.0);
        pdf.text(&ann.text, tx - w, ty, LABEL_SIZE + 1.0, true, "black");
    }

    if !summary_lines.is_empty() {
        let top = grid.y + grid.h + 2.0;
        let width = summary_lines
            .iter()
            .map(|l| approx_text_width(l, TEXT_SIZE))
            .fold(0.0_f32, f32::max)
            + 8.0;
        pdf.rect(
            Rect { x: MARGIN, y: top, w: width.min(PAGE_W - 2.0 * MARGIN), h: summary_h - 2.0 },
            "#f9f9f9",
            Some("#cccccc"),
        );
        for (i, line) in summary_lines.iter().enumerate() {
            let bold = i == 0;
            pdf.text(line, MARGIN + 4.0, top + 6.0 + i as f32 * SUMMARY_LINE_H, TEXT_SIZE, bold, "#333333");
        }
    }
    if let Some(footer) = &fig.footer {
        pdf.text_centered(footer, PAGE_W / 2.0, PAGE_H - MARGIN, TEXT_SIZE, true, "gray");
    }

    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Annotation, Cell};

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#2986cc"), (0x29, 0x86, 0xcc));
        assert_eq!(parse_color("rgb(102, 225, 0)"), (102, 225, 0));
        assert_eq!(parse_color("Purple"), (128, 0, 128));
        assert_eq!(parse_color("no-such-colour"), (128, 128, 128));
    }

    #[test]
    fn test_parse_color_non_ascii_hex_falls_back() {
        assert_eq!(parse_color("#a\u{e9}bbb"), (128, 128, 128));
        assert_eq!(parse_color("#\u{e9}\u{e9}\u{e9}"), (128, 128, 128));
    }

    #[test]
    fn test_pdf_text_replaces_unsupported_glyphs() {
        assert_eq!(pdf_text("\u{20a6}500 May\u{2013}Oct"), "NGN 500 May-Oct");
        assert_eq!(pdf_text("caf\u{e9}"), "caf\u{e9}");
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(12000.0), "12k");
        assert_eq!(tick_label(1500.0), "1.5k");
        assert_eq!(tick_label(7.5), "7.5");
        assert_eq!(tick_label(40.0), "40");
    }

    #[test]
    fn test_render_pdf_produces_document() {
        let mut fig = Figure::new("Board \u{2013} 2025", 2, 2);
        let bar = fig.push(Panel::new(
            "Monthly",
            Cell::at(0, 1),
            PanelKind::Bar(
                Series::new("m", vec!["May".into(), "Jun".into()], vec![520.0, 100.0])
                    .colors(vec!["red".into(), "green".into()]),
            ),
        ));
        fig.push(Panel::new(
            "Share",
            Cell::spanning(0, 0, 2),
            PanelKind::Donut(vec![
                Ring::new("Split", vec!["A".into(), "B".into()], vec![3.0, 1.0]),
                Ring::new("Breakdown", vec!["B1".into()], vec![1.0]).legend_only(),
            ]),
        ));
        fig.annotations.push(Annotation { panel: bar, point: 0, text: "peak".into(), color: "red".into() });
        fig.summary = Some("Summary\nline two".into());
        fig.footer = Some("footer".into());
        let bytes = render_pdf(&fig).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
