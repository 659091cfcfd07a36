#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const CLASSES: [&'static str; 2] = ["light-theme", "dark-theme"];

    pub fn class(self) -> &'static str {
        match self {
            Self::Light => "light-theme",
            Self::Dark => "dark-theme",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Dark when the `dark-theme` marker is present, otherwise light.
    pub fn from_class_list(classes: &str) -> Self {
        if classes.split_whitespace().any(|c| c == "dark-theme") {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn from_config_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "light-theme" => Some(Self::Light),
            "dark" | "dark-theme" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Removes any existing theme marker and adds this theme's.
    pub fn apply_to_class_list(self, classes: &str) -> String {
        classes
            .split_whitespace()
            .filter(|c| !Self::CLASSES.contains(c))
            .chain(std::iter::once(self.class()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
