//! Renderer-neutral description of a multi-panel dashboard.
//!
//! Dashboards build a [`Figure`]; the writers in [`crate::render`] turn it into
//! an interactive HTML page or a static PDF page.

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
    pub annotations: Vec<Annotation>,
    /// Multi-line text box anchored bottom-left.
    pub summary: Option<String>,
    pub footer: Option<String>,
    /// Pixel size hint for the HTML layout.
    pub width: u32,
    pub height: u32,
}

impl Figure {
    pub fn new(title: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            title: title.into(),
            rows: rows.max(1),
            cols: cols.max(1),
            panels: Vec::new(),
            annotations: Vec::new(),
            summary: None,
            footer: None,
            width: 1300,
            height: 500,
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Add a panel and return its index for annotations.
    pub fn push(&mut self, panel: Panel) -> usize {
        self.panels.push(panel);
        self.panels.len() - 1
    }
}

/// Position in the figure grid. Rows count from the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
}

impl Cell {
    pub fn at(row: usize, col: usize) -> Self {
        Self { row, col, row_span: 1 }
    }

    pub fn spanning(row: usize, col: usize, row_span: usize) -> Self {
        Self {
            row,
            col,
            row_span: row_span.max(1),
        }
    }

    /// Fractional `(x0, x1, y0, y1)` of the cell, y measured from the bottom.
    pub fn domain(&self, rows: usize, cols: usize, gap: f64) -> (f64, f64, f64, f64) {
        let w = 1.0 / cols as f64;
        let h = 1.0 / rows as f64;
        let x0 = self.col as f64 * w + gap / 2.0;
        let x1 = (self.col + 1) as f64 * w - gap / 2.0;
        let top = 1.0 - self.row as f64 * h;
        let bottom = 1.0 - (self.row + self.row_span).min(rows) as f64 * h;
        (x0, x1.max(x0), bottom + gap / 2.0, (top - gap / 2.0).max(bottom + gap / 2.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub cell: Cell,
    pub kind: PanelKind,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub y_range: Option<(f64, f64)>,
}

impl Panel {
    pub fn new(title: impl Into<String>, cell: Cell, kind: PanelKind) -> Self {
        Self {
            title: title.into(),
            cell,
            kind,
            x_title: None,
            y_title: None,
            y_range: None,
        }
    }

    pub fn axes(mut self, x_title: &str, y_title: &str) -> Self {
        self.x_title = Some(x_title.to_string());
        self.y_title = Some(y_title.to_string());
        self
    }

    pub fn y_range(mut self, range: (f64, f64)) -> Self {
        self.y_range = Some(range);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Line(Series),
    Bar(Series),
    Scatter(Series),
    Donut(Vec<Ring>),
}

/// Labelled points shared by line, bar and scatter panels.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Per-point hover text; empty means the renderer's default.
    pub hover: Vec<String>,
    /// One colour for every point, or one per point.
    pub colors: Vec<String>,
    /// Line colour for line panels.
    pub line_color: Option<String>,
}

impl Series {
    pub fn new(name: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            labels,
            values,
            hover: Vec::new(),
            colors: Vec::new(),
            line_color: None,
        }
    }

    pub fn hover(mut self, hover: Vec<String>) -> Self {
        self.hover = hover;
        self
    }

    pub fn colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    pub fn line_color(mut self, color: &str) -> Self {
        self.line_color = Some(color.to_string());
        self
    }

    /// Colour for point `i`, cycling through the palette.
    pub fn color_at(&self, i: usize) -> Option<&str> {
        if self.colors.is_empty() {
            None
        } else {
            Some(self.colors[i % self.colors.len()].as_str())
        }
    }
}

/// One ring of a donut. Rings are drawn outermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    pub hover: Vec<String>,
    /// Draw the labels on the slices (outer rings) or leave them to the legend.
    pub show_labels: bool,
}

impl Ring {
    pub fn new(name: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            labels,
            values,
            colors: Vec::new(),
            hover: Vec::new(),
            show_labels: true,
        }
    }

    pub fn colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    pub fn hover(mut self, hover: Vec<String>) -> Self {
        self.hover = hover;
        self
    }

    pub fn legend_only(mut self) -> Self {
        self.show_labels = false;
        self
    }

    pub fn total(&self) -> f64 {
        self.values.iter().filter(|v| **v > 0.0).sum()
    }
}

/// Arrow annotation pointing at one point of a panel's series.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub panel: usize,
    pub point: usize,
    pub text: String,
    pub color: String,
}
