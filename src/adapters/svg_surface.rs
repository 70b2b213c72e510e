//! Reference surface that rasterises a frame plan into an SVG document.

use crate::domain::error::ChartError;
use crate::domain::paint::{Fill, FramePlan, PaintCommand, StrokeStyle, TextAnchor};
use crate::ports::surface_port::SurfacePort;
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

/// Renders each presented plan into a standalone SVG document. When built
/// with [`SvgSurface::to_file`] every frame is also written to disk.
#[derive(Debug, Default)]
pub struct SvgSurface {
    output: Option<PathBuf>,
    document: String,
    frames: usize,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_file(path: PathBuf) -> Self {
        Self {
            output: Some(path),
            ..Self::default()
        }
    }

    /// The most recently rendered document; empty until the first frame.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn frames_presented(&self) -> usize {
        self.frames
    }
}

impl SurfacePort for SvgSurface {
    fn present(&mut self, plan: &FramePlan) -> Result<(), ChartError> {
        self.document = render_svg(plan)?;
        self.frames += 1;
        if let Some(path) = &self.output {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(ChartError::Io)?;
            }
            fs::write(path, &self.document).map_err(ChartError::Io)?;
        }
        Ok(())
    }
}

fn render_error(e: std::fmt::Error) -> ChartError {
    ChartError::Render {
        reason: format!("failed to format SVG: {}", e),
    }
}

pub fn render_svg(plan: &FramePlan) -> Result<String, ChartError> {
    let (width, height) = plan
        .ops
        .iter()
        .find_map(|op| match op.command {
            PaintCommand::Clear { width, height } => Some((width, height)),
            _ => None,
        })
        .unwrap_or((plan.layout.dims.width, plan.layout.dims.height));

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = width,
        h = height
    )
    .map_err(render_error)?;
    for op in &plan.ops {
        write_command(&mut svg, &op.command).map_err(render_error)?;
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn write_command(svg: &mut String, command: &PaintCommand) -> std::fmt::Result {
    match command {
        // The document itself starts blank.
        PaintCommand::Clear { .. } => Ok(()),
        PaintCommand::FillRect {
            x,
            y,
            width,
            height,
            fill,
        } => writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"{}/>"#,
            x,
            y,
            width.max(0.0),
            height.max(0.0),
            fill_attrs(fill)
        ),
        PaintCommand::StrokeRect {
            x,
            y,
            width,
            height,
            stroke,
        } => writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none"{}/>"#,
            x,
            y,
            width.max(0.0),
            height.max(0.0),
            stroke_attrs(stroke)
        ),
        PaintCommand::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"{}/>"#,
            x1,
            y1,
            x2,
            y2,
            stroke_attrs(stroke)
        ),
        PaintCommand::Path { points, stroke } => writeln!(
            svg,
            r#"<polyline points="{}" fill="none"{}/>"#,
            points_attr(points),
            stroke_attrs(stroke)
        ),
        PaintCommand::FillPath { points, fill } => writeln!(
            svg,
            r#"<polygon points="{}"{}/>"#,
            points_attr(points),
            fill_attrs(fill)
        ),
        PaintCommand::Ellipse {
            cx,
            cy,
            rx,
            ry,
            stroke,
            fill,
        } => {
            let fill = fill
                .as_ref()
                .map(fill_attrs)
                .unwrap_or_else(|| r#" fill="none""#.to_string());
            writeln!(
                svg,
                r#"<ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}"{}{}/>"#,
                cx,
                cy,
                rx,
                ry,
                fill,
                stroke_attrs(stroke)
            )
        }
        PaintCommand::Text {
            x,
            y,
            text,
            color,
            size,
            anchor,
        } => writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="{:.0}" font-family="monospace" text-anchor="{}">{}</text>"#,
            x,
            y,
            escape(color),
            size,
            anchor_name(*anchor),
            escape(text)
        ),
    }
}

fn fill_attrs(fill: &Fill) -> String {
    if fill.opacity < 1.0 {
        format!(
            r#" fill="{}" fill-opacity="{:.2}""#,
            escape(&fill.color),
            fill.opacity.max(0.0)
        )
    } else {
        format!(r#" fill="{}""#, escape(&fill.color))
    }
}

fn stroke_attrs(stroke: &StrokeStyle) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{:.1}""#,
        escape(&stroke.color),
        stroke.width
    );
    if let Some((dash, gap)) = stroke.dash {
        attrs.push_str(&format!(r#" stroke-dasharray="{:.1} {:.1}""#, dash, gap));
    }
    attrs
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn anchor_name(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
