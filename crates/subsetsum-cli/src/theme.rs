use crossterm::style::Color;

/// Colors for the progress line
#[derive(Debug, Clone)]
pub struct Theme {
    /// Filled part of the bar
    pub bar: Color,
    /// Unfilled part of the bar
    pub track: Color,
    /// Counters next to the bar
    pub info: Color,
    /// Found combinations
    pub success: Color,
    /// Cancelled or capped searches
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bar: Color::Rgb { r: 80, g: 180, b: 255 },
            track: Color::Rgb { r: 70, g: 75, b: 90 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            warning: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bar: Color::Rgb { r: 30, g: 100, b: 200 },
            track: Color::Rgb { r: 190, g: 190, b: 200 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            success: Color::Rgb { r: 20, g: 140, b: 60 },
            warning: Color::Rgb { r: 190, g: 120, b: 0 },
        }
    }
}
