pub const NEUTRAL_GRAY: &str = "#999999";

const LIGHT_DELTA: i32 = 40;
const DARK_DELTA: i32 = -40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Accepts `#rgb`, `#rrggbb` and the same without the leading `#`.
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_owned(),
            _ => return None,
        };

        let channel = |offset: usize| u8::from_str_radix(&expanded[offset..offset + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn neutral() -> Self {
        Self {
            r: 0x99,
            g: 0x99,
            b: 0x99,
        }
    }

    pub fn offset(self, delta: i32) -> Self {
        let channel = |value: u8| (i32::from(value) + delta).clamp(0, 255) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Light, base and dark stops of a node gradient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Triad {
    pub light: String,
    pub base: String,
    pub dark: String,
}

pub fn shade(base_hex: &str, delta: i32) -> String {
    match Rgb::parse(base_hex) {
        Some(rgb) => rgb.offset(delta).to_hex(),
        None => NEUTRAL_GRAY.to_owned(),
    }
}

pub fn triad(base_hex: &str) -> Triad {
    let Some(base) = Rgb::parse(base_hex) else {
        return Triad {
            light: NEUTRAL_GRAY.to_owned(),
            base: NEUTRAL_GRAY.to_owned(),
            dark: NEUTRAL_GRAY.to_owned(),
        };
    };

    Triad {
        light: base.offset(LIGHT_DELTA).to_hex(),
        base: base.to_hex(),
        dark: base.offset(DARK_DELTA).to_hex(),
    }
}
