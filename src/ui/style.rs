use crate::config::ColorMode;

// 256-colour approximations of the portal palette
const ACCENT: u8 = 81;
const DANGER: u8 = 203;
const MUTED: u8 = 245;

/// Terminal styling for the text renderer. Disabled styles pass text through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    pub fn colored() -> Self {
        Self { enabled: true }
    }

    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Always => {
                console::set_colors_enabled(true);
                Self::colored()
            }
            ColorMode::Never => {
                console::set_colors_enabled(false);
                Self::plain()
            }
            ColorMode::Auto => Self {
                enabled: std::env::var_os("NO_COLOR").is_none()
                    && console::colors_enabled()
                    && console::Term::stdout().features().colors_supported(),
            },
        }
    }

    /// Styles are forced on or off so output never depends on the global
    /// console state once the mode has been chosen.
    fn apply(&self, style: console::Style, s: &str) -> String {
        style.force_styling(self.enabled).apply_to(s).to_string()
    }

    pub fn strong(&self, s: &str) -> String {
        self.apply(console::Style::new().bold(), s)
    }

    pub fn accent(&self, s: &str) -> String {
        self.apply(console::Style::new().color256(ACCENT), s)
    }

    pub fn muted(&self, s: &str) -> String {
        self.apply(console::Style::new().color256(MUTED), s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.apply(console::Style::new().dim(), s)
    }

    pub fn danger(&self, s: &str) -> String {
        self.apply(console::Style::new().color256(DANGER), s)
    }
}
