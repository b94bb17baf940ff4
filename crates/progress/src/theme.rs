//! Optional styling layer applied to rendered text

use console::Style;
use tickline_config::ColorChoice;

/// Per-element styles for the progress line
///
/// A disabled theme returns text untouched, which keeps output stable for
/// pipes, log files and tests.
#[derive(Debug, Clone)]
pub struct Theme {
    enabled: bool,
    label: Style,
    bar_filled: Style,
    bar_empty: Style,
    percentage: Style,
    eta: Style,
    trend: Style,
    summary: Style,
}

/// Which part of the line a piece of text belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Label,
    BarFilled,
    BarEmpty,
    Percentage,
    Eta,
    Trend,
    Summary,
}

impl Theme {
    /// No styling at all
    #[must_use]
    pub fn plain() -> Self {
        Self {
            enabled: false,
            label: Style::new(),
            bar_filled: Style::new(),
            bar_empty: Style::new(),
            percentage: Style::new(),
            eta: Style::new(),
            trend: Style::new(),
            summary: Style::new(),
        }
    }

    /// Default colors; `console` still honors `NO_COLOR` and non-tty output
    #[must_use]
    pub fn colored() -> Self {
        Self {
            enabled: true,
            label: Style::new().bold(),
            bar_filled: Style::new().green(),
            bar_empty: Style::new().dim(),
            percentage: Style::new().yellow(),
            eta: Style::new().cyan(),
            trend: Style::new().magenta(),
            summary: Style::new().green().bold(),
        }
    }

    /// Theme matching a configured color choice
    #[must_use]
    pub fn for_choice(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Never => Self::plain(),
            ColorChoice::Auto => Self::colored(),
            ColorChoice::Always => {
                let mut theme = Self::colored();
                for style in [
                    &mut theme.label,
                    &mut theme.bar_filled,
                    &mut theme.bar_empty,
                    &mut theme.percentage,
                    &mut theme.eta,
                    &mut theme.trend,
                    &mut theme.summary,
                ] {
                    *style = style.clone().force_styling(true);
                }
                theme
            }
        }
    }

    /// Whether this theme decorates text at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Apply the style for `element` to `text`
    #[must_use]
    pub fn paint(&self, element: Element, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let style = match element {
            Element::Label => &self.label,
            Element::BarFilled => &self.bar_filled,
            Element::BarEmpty => &self.bar_empty,
            Element::Percentage => &self.percentage,
            Element::Eta => &self.eta,
            Element::Trend => &self.trend,
            Element::Summary => &self.summary,
        };
        style.apply_to(text).to_string()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::colored()
    }
}
