//! Font measurement for export layout.
//!
//! With the `embed_inter` feature the Inter variable font is embedded and measured with
//! `fontdue`. Without it (the default) a heuristic tuned for Inter/Helvetica is used, so
//! layout stays deterministic on every platform.
//!
//! Expected font location when the feature is enabled: `ui/assets/Inter-Variable.ttf`.

use std::fmt;

use once_cell::sync::Lazy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    SemiBold,
    Bold,
}

impl FontWeight {
    /// Value for the SVG `font-weight` attribute.
    pub fn css_weight(&self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontWeight::Regular => "Regular",
            FontWeight::SemiBold => "SemiBold",
            FontWeight::Bold => "Bold",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Vertical advance between baselines.
    pub line_h: f64,
    /// Distance from the top of the line box to the baseline.
    pub asc: f64,
    pub desc: f64,
}

pub enum Fonts {
    #[cfg(feature = "embed_inter")]
    Embedded(fontdue::Font),
    Heuristic,
}

impl Fonts {
    pub fn load() -> Self {
        #[cfg(feature = "embed_inter")]
        {
            const VAR_BYTES: &[u8] = include_bytes!("../../assets/Inter-Variable.ttf");
            match fontdue::Font::from_bytes(VAR_BYTES, Default::default()) {
                Ok(font) => return Fonts::Embedded(font),
                Err(err) => tracing::warn!(error = err, "embedded Inter failed to parse"),
            }
        }
        Fonts::Heuristic
    }

    pub fn metrics(&self, _weight: FontWeight, size_px: f64) -> TextMetrics {
        let line_h = match self {
            #[cfg(feature = "embed_inter")]
            Fonts::Embedded(font) => {
                let m = font.metrics('M', size_px as f32);
                (m.height as f64).max(size_px * 1.24).ceil()
            }
            Fonts::Heuristic => (size_px * 1.28).round(),
        };
        let asc = (size_px * 0.92).round();
        let desc = (line_h - asc).max(size_px * 0.08).round();
        TextMetrics { line_h, asc, desc }
    }

    /// Rendered width of `text` on one line.
    pub fn text_width(&self, weight: FontWeight, size_px: f64, text: &str) -> f64 {
        match self {
            #[cfg(feature = "embed_inter")]
            Fonts::Embedded(font) => text
                .chars()
                .map(|ch| font.metrics(ch, size_px as f32).advance_width as f64)
                .sum::<f64>()
                * weight_spread(weight),
            Fonts::Heuristic => {
                text.chars().map(char_em).sum::<f64>() * size_px * weight_spread(weight)
            }
        }
    }
}

fn weight_spread(weight: FontWeight) -> f64 {
    match weight {
        FontWeight::Regular => 1.0,
        FontWeight::SemiBold => 1.04,
        FontWeight::Bold => 1.07,
    }
}

/// Approximate advance of one character in ems.
fn char_em(ch: char) -> f64 {
    match ch {
        ' ' => 0.28,
        'i' | 'l' | 'j' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' => 0.84,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.64,
        _ => 0.54,
    }
}

static FONTS: Lazy<Fonts> = Lazy::new(Fonts::load);

pub fn measure(weight: FontWeight, size_px: f64) -> TextMetrics {
    FONTS.metrics(weight, size_px)
}

pub fn text_width(weight: FontWeight, size_px: f64, text: &str) -> f64 {
    FONTS.text_width(weight, size_px, text)
}

/// Greedy word wrap to `max_width`. Words wider than a whole line are broken by char.
pub fn wrap_text(text: &str, weight: FontWeight, size_px: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(weight, size_px, &candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(weight, size_px, word) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    current.push(ch);
                    if text_width(weight, size_px, &current) > max_width && current.chars().count() > 1 {
                        let last = current.pop().unwrap_or(ch);
                        lines.push(std::mem::take(&mut current));
                        current.push(last);
                    }
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cut `text` to fit `max_width`, ending with an ellipsis when shortened.
pub fn fit_line(text: &str, weight: FontWeight, size_px: f64, max_width: f64) -> String {
    if text_width(weight, size_px, text) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if text_width(weight, size_px, &format!("{out}…")) > max_width {
            out.pop();
            break;
        }
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_increase_with_size() {
        let small = measure(FontWeight::Regular, 12.0);
        let large = measure(FontWeight::Regular, 48.0);
        assert!(large.line_h > small.line_h);
        assert!(large.asc > small.asc);
    }

    #[test]
    fn baseline_consistency_ratio() {
        let m = measure(FontWeight::SemiBold, 32.0);
        let baseline_ratio = m.asc / 32.0;
        assert!(baseline_ratio > 0.80 && baseline_ratio < 1.05);
    }

    #[test]
    fn wrapping_respects_width() {
        let text = "Attendance grew steadily across every community during the spring season";
        let lines = wrap_text(text, FontWeight::Regular, 16.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(FontWeight::Regular, 16.0, line) <= 200.0, "{line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn blank_lines_are_kept() {
        let lines = wrap_text("first\n\nthird", FontWeight::Regular, 14.0, 500.0);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn fit_line_truncates_with_ellipsis() {
        let fitted = fit_line("A very long cancellation reason", FontWeight::Regular, 14.0, 80.0);
        assert!(fitted.ends_with('…'));
        assert!(text_width(FontWeight::Regular, 14.0, &fitted) <= 80.0);
    }
}
