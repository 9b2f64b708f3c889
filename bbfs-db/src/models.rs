use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A single 4D result. Only ever holds four decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Draw {
    digits: [u8; 4],
}

impl Draw {
    pub fn from_digits(digits: [u8; 4]) -> Result<Self> {
        if let Some(&d) = digits.iter().find(|&&d| d > 9) {
            bail!("Digit {} out of range (0-9)", d);
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> &[u8; 4] {
        &self.digits
    }

    /// Hundreds digit (position 1), the "kepala".
    pub fn head(&self) -> u8 {
        self.digits[1]
    }

    /// Last two digits as a number, the "ekor".
    pub fn tail(&self) -> u8 {
        self.digits[2] * 10 + self.digits[3]
    }

    pub fn tail_digits(&self) -> &[u8] {
        &self.digits[2..]
    }

    /// Hundreds, tens and units.
    pub fn last_three(&self) -> &[u8] {
        &self.digits[1..]
    }
}

impl std::str::FromStr for Draw {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            bail!("Malformed result '{}': expected exactly 4 digits", s);
        }
        Ok(Self {
            digits: [
                bytes[0] - b'0',
                bytes[1] - b'0',
                bytes[2] - b'0',
                bytes[3] - b'0',
            ],
        })
    }
}

impl TryFrom<String> for Draw {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Draw> for String {
    fn from(draw: Draw) -> Self {
        draw.to_string()
    }
}

impl std::fmt::Display for Draw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.digits;
        write!(f, "{a}{b}{c}{d}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    HongkongPools,
    SydneyPools,
    HongkongLotto,
    SydneyLotto,
}

impl Market {
    pub const ALL: [Market; 4] = [
        Market::HongkongPools,
        Market::SydneyPools,
        Market::HongkongLotto,
        Market::SydneyLotto,
    ];

    /// File stem of the market's history file.
    pub fn code(&self) -> &'static str {
        match self {
            Market::HongkongPools => "hongkong_pools",
            Market::SydneyPools => "sydney_pools",
            Market::HongkongLotto => "hongkong_lotto",
            Market::SydneyLotto => "sydney_lotto",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Market::HongkongPools => "Hongkong Pools",
            Market::SydneyPools => "Sydney Pools",
            Market::HongkongLotto => "Hongkong Lotto",
            Market::SydneyLotto => "Sydney Lotto",
        }
    }

    pub fn menu_key(&self) -> &'static str {
        match self {
            Market::HongkongPools => "1",
            Market::SydneyPools => "2",
            Market::HongkongLotto => "3",
            Market::SydneyLotto => "4",
        }
    }
}

impl std::str::FromStr for Market {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        match key.as_str() {
            "1" | "hongkong_pools" | "hk_pools" | "hkp" => Ok(Market::HongkongPools),
            "2" | "sydney_pools" | "sdy_pools" | "sdp" => Ok(Market::SydneyPools),
            "3" | "hongkong_lotto" | "hk_lotto" | "hkl" => Ok(Market::HongkongLotto),
            "4" | "sydney_lotto" | "sdy_lotto" | "sdl" => Ok(Market::SydneyLotto),
            _ => bail!("Unknown market '{}' (expected 1-4 or a market code)", s),
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parses a line of a history file, ignoring surrounding whitespace.
pub fn parse_line(line: &str) -> Option<Draw> {
    line.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_draw_ok() {
        let draw: Draw = "1234".parse().unwrap();
        assert_eq!(draw.digits(), &[1, 2, 3, 4]);
        assert_eq!(draw.to_string(), "1234");
    }

    #[test]
    fn test_parse_draw_keeps_leading_zeros() {
        let draw: Draw = "0007".parse().unwrap();
        assert_eq!(draw.to_string(), "0007");
        assert_eq!(draw.tail(), 7);
    }

    #[test]
    fn test_parse_draw_malformed() {
        assert!("123".parse::<Draw>().is_err());
        assert!("12345".parse::<Draw>().is_err());
        assert!("12a4".parse::<Draw>().is_err());
        assert!("-123".parse::<Draw>().is_err());
        assert!("".parse::<Draw>().is_err());
    }

    #[test]
    fn test_draw_positions() {
        let draw: Draw = "9876".parse().unwrap();
        assert_eq!(draw.head(), 8);
        assert_eq!(draw.tail(), 76);
        assert_eq!(draw.tail_digits(), &[7, 6]);
        assert_eq!(draw.last_three(), &[8, 7, 6]);
    }

    #[test]
    fn test_from_digits_out_of_range() {
        assert!(Draw::from_digits([1, 2, 3, 4]).is_ok());
        assert!(Draw::from_digits([1, 2, 10, 4]).is_err());
    }

    #[test]
    fn test_parse_line_trims() {
        assert_eq!(parse_line("  4321\r").map(|d| d.to_string()), Some("4321".to_string()));
        assert!(parse_line("43 21").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn test_market_from_str() {
        assert_eq!("1".parse::<Market>().unwrap(), Market::HongkongPools);
        assert_eq!("sydney-lotto".parse::<Market>().unwrap(), Market::SydneyLotto);
        assert_eq!("HK_LOTTO".parse::<Market>().unwrap(), Market::HongkongLotto);
        assert!("5".parse::<Market>().is_err());
    }

    #[test]
    fn test_market_codes_unique() {
        for (i, a) in Market::ALL.iter().enumerate() {
            for b in &Market::ALL[i + 1..] {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.menu_key(), b.menu_key());
            }
        }
    }
}
