//! Annotations anchored to (candle index, price) coordinates.

use std::fmt;
use std::str::FromStr;

/// Retracement levels drawn between the two anchor points of a fibonacci annotation.
/// Colour of drawings committed or in progress through pointer input.
pub const DEFAULT_DRAWING_COLOR: &str = "#3b82f6";

pub const FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// x is a fractional candle index, y is a price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawingKind {
    Trendline,
    Horizontal,
    Vertical,
    Ray,
    Rectangle,
    Ellipse,
    Fibonacci,
    Zone,
}

impl DrawingKind {
    pub const ALL: [DrawingKind; 8] = [
        DrawingKind::Trendline,
        DrawingKind::Horizontal,
        DrawingKind::Vertical,
        DrawingKind::Ray,
        DrawingKind::Rectangle,
        DrawingKind::Ellipse,
        DrawingKind::Fibonacci,
        DrawingKind::Zone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DrawingKind::Trendline => "trendline",
            DrawingKind::Horizontal => "horizontal",
            DrawingKind::Vertical => "vertical",
            DrawingKind::Ray => "ray",
            DrawingKind::Rectangle => "rectangle",
            DrawingKind::Ellipse => "ellipse",
            DrawingKind::Fibonacci => "fibonacci",
            DrawingKind::Zone => "zone",
        }
    }
}

impl fmt::Display for DrawingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrawingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let lower = match lower.as_str() {
            "fib" => "fibonacci",
            "horizontal_ray" => "ray",
            other => other,
        };
        DrawingKind::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| format!("unknown drawing tool '{}'", s.trim()))
    }
}

/// Where an annotation came from. Suggested zones are machine detected and
/// carry the scores the detector produced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnnotationSource {
    User,
    Suggested {
        compression_ratio: f64,
        confidence: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drawing {
    pub id: u64,
    pub kind: DrawingKind,
    /// One or two anchor points, never more.
    pub points: Vec<Point>,
    pub color: String,
    pub visible: bool,
    pub locked: bool,
    pub label: Option<String>,
    pub source: AnnotationSource,
}

impl Drawing {
    pub fn user(id: u64, kind: DrawingKind, start: Point, end: Point, color: &str) -> Self {
        Self {
            id,
            kind,
            points: vec![start, end],
            color: color.to_string(),
            visible: true,
            locked: false,
            label: None,
            source: AnnotationSource::User,
        }
    }

    /// A machine-detected price band between `low` and `high` spanning candle
    /// indices `start..=end`.
    pub fn suggested_zone(
        id: u64,
        start: f64,
        end: f64,
        low: f64,
        high: f64,
        compression_ratio: f64,
        confidence: f64,
    ) -> Self {
        Self {
            id,
            kind: DrawingKind::Rectangle,
            points: vec![Point::new(start, high), Point::new(end, low)],
            color: "#eab308".to_string(),
            visible: true,
            locked: true,
            label: None,
            source: AnnotationSource::Suggested {
                compression_ratio,
                confidence,
            },
        }
    }

    pub fn is_suggested(&self) -> bool {
        matches!(self.source, AnnotationSource::Suggested { .. })
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Second anchor, or the first one again for single-point drawings.
    pub fn end(&self) -> Option<Point> {
        self.points.get(1).or_else(|| self.points.first()).copied()
    }

    /// Visibility is one of the two fields a caller may still change after commit.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Price of each fibonacci level, measured from the end point back toward the start.
    pub fn fib_prices(&self) -> Vec<(f64, f64)> {
        let (Some(start), Some(end)) = (self.start(), self.end()) else {
            return Vec::new();
        };
        let diff = end.y - start.y;
        FIB_LEVELS
            .iter()
            .map(|&level| (level, end.y - diff * level))
            .collect()
    }
}
