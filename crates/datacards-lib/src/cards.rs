//! Presentation of projected rows.

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::projector::Projection;
use crate::settings::CardSettings;

/// Turns already-formatted rows into some output.
pub trait RowPresenter {
    type Output;

    fn present(&self, projection: &Projection) -> Self::Output;
}

pub const EMPTY_MESSAGE: &str = "No data available.";
const ELLIPSIS: char = '…';

/// Plain-text cards: optional title header, then one block of `Label: value` lines per row.
#[derive(Debug, Clone)]
pub struct TextCardPresenter {
    settings: CardSettings,
    max_value_width: usize,
}

impl TextCardPresenter {
    pub fn new(settings: CardSettings, max_value_width: usize) -> Self {
        Self {
            settings,
            max_value_width: max_value_width.max(1),
        }
    }

    fn header(&self, rows: usize) -> Option<String> {
        if !self.settings.show_header || self.settings.title.is_empty() {
            return None;
        }
        Some(format!("{}\nShowing {} rows\n", self.settings.title, rows))
    }
}

impl RowPresenter for TextCardPresenter {
    type Output = String;

    fn present(&self, projection: &Projection) -> String {
        if projection.is_empty() {
            return format!("{}\n", EMPTY_MESSAGE);
        }

        let mut out = String::new();
        if let Some(header) = self.header(projection.len()) {
            out.push_str(&header);
            out.push('\n');
        }

        let labels: Vec<String> = projection.headers.iter().map(|h| capitalize(h)).collect();
        let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        for (i, row) in projection.rows.iter().enumerate() {
            if i > 0 {
                out.push_str(&"-".repeat(label_width + 2 + self.max_value_width.min(24)));
                out.push('\n');
            }
            for (header, label) in projection.headers.iter().zip(&labels) {
                let Some(value) = row.get(header) else {
                    continue;
                };
                let value = truncate(&value.to_display_string(), self.max_value_width);
                out.push_str(&format!(
                    "{:<width$}  {}\n",
                    format!("{}:", label),
                    value,
                    width = label_width + 1
                ));
            }
        }
        out
    }
}

/// Rows as a JSON array of objects.
#[derive(Debug, Clone, Default)]
pub struct JsonPresenter {
    pub pretty: bool,
}

impl RowPresenter for JsonPresenter {
    type Output = Result<String>;

    fn present(&self, projection: &Projection) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&projection.rows)
        } else {
            serde_json::to_string(&projection.rows)
        };
        rendered.map_err(|e| eyre!("Failed to serialize rows: {}", e))
    }
}

/// Uppercase the first letter of each word.
fn capitalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CellValue, DisplayRow};

    fn projection() -> Projection {
        let mut a = DisplayRow::new();
        a.insert("name", CellValue::Text("Bob".into()));
        a.insert("amount", CellValue::Number(10.0));
        let mut b = DisplayRow::new();
        b.insert("name", CellValue::Text("Joe".into()));
        b.insert("amount", CellValue::Text("20.00".into()));
        Projection {
            rows: vec![a, b],
            headers: vec!["name".into(), "amount".into()],
            warnings: vec![],
        }
    }

    #[test]
    fn test_empty_projection() {
        let presenter = TextCardPresenter::new(CardSettings::default(), 40);
        assert_eq!(presenter.present(&Projection::default()), "No data available.\n");
    }

    #[test]
    fn test_cards_follow_header_order() {
        let presenter = TextCardPresenter::new(CardSettings::default(), 40);
        let out = presenter.present(&projection());
        assert!(out.starts_with("Untitled\nShowing 2 rows\n"));
        let name = out.find("Name:").unwrap();
        let amount = out.find("Amount:").unwrap();
        assert!(name < amount);
        assert!(out.contains("Amount:  10\n"));
        assert!(out.contains("Amount:  20.00\n"));
    }

    #[test]
    fn test_header_hidden() {
        let settings = CardSettings {
            show_header: false,
            ..CardSettings::default()
        };
        let out = TextCardPresenter::new(settings, 40).present(&projection());
        assert!(!out.contains("Showing"));
    }

    #[test]
    fn test_truncation() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abcd", 4), "abcd");
    }

    #[test]
    fn test_json_presenter() {
        let out = JsonPresenter::default().present(&projection()).unwrap();
        assert_eq!(
            out,
            r#"[{"amount":10,"name":"Bob"},{"amount":"20.00","name":"Joe"}]"#
        );
    }
}
