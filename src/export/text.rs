//! Multi-colour text reduction.
//!
//! Target text fields carry a single colour. The colour covering the most
//! characters becomes the field colour; every other run is wrapped in an
//! inline colour tag.

use crate::types::{Colour, TextRun};

/// A piece of text; `color` is `None` when it uses the field colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub color: Option<Colour>,
}

/// Text reduced to a base colour plus tagged minority spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    pub base: Colour,
    pub spans: Vec<Span>,
}

impl TextContent {
    /// Reduce decoded runs. Ties go to the colour seen first.
    pub fn from_runs(runs: &[TextRun]) -> Self {
        let mut totals: Vec<(Colour, usize)> = Vec::new();
        for run in runs {
            let count = run.text.chars().count();
            match totals.iter_mut().find(|(c, _)| *c == run.color) {
                Some((_, total)) => *total += count,
                None => totals.push((run.color, count)),
            }
        }

        let mut base = Colour::BLACK;
        let mut best = None;
        for (colour, total) in &totals {
            if best.map_or(true, |b| *total > b) {
                base = *colour;
                best = Some(*total);
            }
        }

        let mut spans: Vec<Span> = Vec::new();
        for run in runs.iter().filter(|r| !r.text.is_empty()) {
            let color = (run.color != base).then_some(run.color);
            match spans.last_mut() {
                Some(last) if last.color == color => last.text.push_str(&run.text),
                _ => spans.push(Span {
                    text: run.text.clone(),
                    color,
                }),
            }
        }

        Self { base, spans }
    }

    /// Whether any span needs an inline tag.
    pub fn is_tagged(&self) -> bool {
        self.spans.iter().any(|s| s.color.is_some())
    }

    /// The text without markup.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// UBB markup: `[color=#rrggbb]..[/color]`. A literal `[` is written
    /// as `\[`.
    pub fn to_ubb(&self) -> String {
        self.markup(|c| format!("[color={}]", c.to_hex_rgb()), "[/color]", |text| text.replace('[', "\\["))
    }

    /// Engine rich text: `<color=#rrggbb>..</color>`. A literal `<` is
    /// followed by a zero-width space so it never opens a tag.
    pub fn to_rich_text(&self) -> String {
        self.markup(|c| format!("<color={}>", c.to_hex_rgb()), "</color>", |text| {
            text.replace('<', "<\u{200B}")
        })
    }

    fn markup(&self, open: impl Fn(Colour) -> String, close: &str, escape: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        for span in &self.spans {
            match span.color {
                Some(colour) => {
                    out.push_str(&open(colour));
                    out.push_str(&escape(&span.text));
                    out.push_str(close);
                }
                None => out.push_str(&escape(&span.text)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Colour = Colour::rgb(255, 0, 0);
    const BLUE: Colour = Colour::rgb(0, 0, 255);

    #[test]
    fn test_majority_colour_is_base() {
        let content = TextContent::from_runs(&[TextRun::new("AB", RED), TextRun::new("C", BLUE)]);
        assert_eq!(content.base, RED);
        assert_eq!(content.to_ubb(), "AB[color=#0000ff]C[/color]");
        assert_eq!(content.to_rich_text(), "AB<color=#0000ff>C</color>");
        assert_eq!(content.plain(), "ABC");
    }

    #[test]
    fn test_single_colour_untagged() {
        let content = TextContent::from_runs(&[TextRun::new("Hel", RED), TextRun::new("lo", RED)]);
        assert!(!content.is_tagged());
        assert_eq!(content.spans.len(), 1);
        assert_eq!(content.to_ubb(), "Hello");
    }

    #[test]
    fn test_counts_characters_not_runs() {
        let content = TextContent::from_runs(&[
            TextRun::new("a", RED),
            TextRun::new("bcdef", BLUE),
            TextRun::new("g", RED),
        ]);
        assert_eq!(content.base, BLUE);
        assert_eq!(
            content.to_ubb(),
            "[color=#ff0000]a[/color]bcdef[color=#ff0000]g[/color]"
        );
    }

    #[test]
    fn test_tie_goes_to_first_colour() {
        let content = TextContent::from_runs(&[TextRun::new("ab", BLUE), TextRun::new("cd", RED)]);
        assert_eq!(content.base, BLUE);
    }

    #[test]
    fn test_multibyte_characters_counted_once() {
        let content = TextContent::from_runs(&[TextRun::new("你好", RED), TextRun::new("abc", BLUE)]);
        assert_eq!(content.base, BLUE);
    }

    #[test]
    fn test_markup_characters_escaped() {
        let content = TextContent::from_runs(&[TextRun::new("a[b]<i>", RED), TextRun::new("[x", BLUE)]);
        assert_eq!(content.to_ubb(), "a\\[b]<i>[color=#0000ff]\\[x[/color]");
        assert_eq!(
            content.to_rich_text(),
            "a[b]<\u{200B}i><color=#0000ff>[x</color>"
        );
        assert_eq!(content.plain(), "a[b]<i>[x");
    }

    #[test]
    fn test_empty_runs() {
        let content = TextContent::from_runs(&[]);
        assert_eq!(content.base, Colour::BLACK);
        assert_eq!(content.plain(), "");
    }
}
