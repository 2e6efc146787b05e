use ratatui::style::{Color, palette::tailwind};

use crate::format::RsiClass;

pub struct TableColors {
    pub buffer_bg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub row_fg: Color,
    pub selected_row_style_fg: Color,
    pub normal_row_color: Color,
    pub alt_row_color: Color,
    pub footer_border_color: Color,
    pub disabled_fg: Color,
}

impl TableColors {
    pub const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            header_fg: tailwind::SLATE.c200,
            row_fg: tailwind::SLATE.c200,
            selected_row_style_fg: color.c400,
            normal_row_color: tailwind::SLATE.c950,
            alt_row_color: tailwind::SLATE.c900,
            footer_border_color: color.c400,
            disabled_fg: tailwind::SLATE.c500,
        }
    }

    pub fn rsi_color(&self, class: RsiClass) -> Color {
        match class {
            RsiClass::Oversold => Color::Green,
            RsiClass::Overbought => Color::Red,
            RsiClass::Neutral => self.row_fg,
        }
    }
}
