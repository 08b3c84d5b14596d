use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    /// Entries for processes that have exited.
    pub text_dead: Color,
    pub current_marker: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub sparkline_color: Color,
    pub delta_up: Color,
    pub delta_down: Color,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            selection_bg: Color::Rgb(51, 65, 85),
            selection_fg: Color::White,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_dead: Color::DarkGray,
            current_marker: Color::Rgb(251, 146, 60),
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            sparkline_color: Color::Rgb(103, 232, 249),
            delta_up: Color::Rgb(239, 68, 68),
            delta_down: Color::Rgb(16, 185, 129),
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            selection_bg: Color::Rgb(200, 215, 235),
            selection_fg: Color::Black,
            status_ok: Color::Rgb(0, 120, 0),
            status_err: Color::Red,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            text_dead: Color::Rgb(150, 150, 150),
            current_marker: Color::Rgb(200, 100, 0),
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            sparkline_color: Color::Rgb(70, 130, 180),
            delta_up: Color::Rgb(200, 60, 60),
            delta_down: Color::Rgb(60, 160, 60),
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            selection_bg: Color::White,
            selection_fg: Color::Black,
            status_ok: Color::White,
            status_err: Color::White,
            statusbar_bg: Color::Black,
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            text_dead: Color::DarkGray,
            current_marker: Color::White,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            sparkline_color: Color::White,
            delta_up: Color::White,
            delta_down: Color::White,
        }
    }

    /// Color for a signed change: growth is the suspicious direction.
    pub fn delta_color(&self, delta: i64) -> Color {
        match delta.signum() {
            1 => self.delta_up,
            -1 => self.delta_down,
            _ => self.text_secondary,
        }
    }
}
