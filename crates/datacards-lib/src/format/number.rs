//! Number formatting with the d3-format specifier mini-language.
//!
//! A specifier has the shape `[[fill]align][sign][symbol][0][width][,][.precision][~][type]`:
//!
//! - `align`: `<` left, `>` right (default), `^` center, `=` pad after the sign
//! - `sign`: `-` (default), `+`, `(` for accounting parentheses, or space
//! - `symbol`: `$` for the locale currency, `#` for `0b`/`0o`/`0x` radix prefixes
//! - `0`: zero padding (implies fill `0` and align `=`)
//! - `,`: locale thousands grouping
//! - `~`: trim insignificant trailing zeros
//! - `type`: `e f g r s % p d b o x X c n`, or none
//!
//! Rounding follows the browser `toFixed`/`toExponential`/`toPrecision` rule:
//! the exact binary value is rounded to nearest, ties away from zero.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

use super::js_number_string;

/// Widest padded output a specifier may ask for.
pub const MAX_WIDTH: usize = 1024;

/// Extra digits rendered past the rounding position so the half-up decision sees the exact tail.
const GUARD_DIGITS: usize = 30;

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

fn specifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:(.)?([<>=^]))?([+\-( ])?([$#])?(0)?(\d+)?(,)?(\.\d+)?(~)?([a-z%])?$")
            .expect("format specifier pattern is valid")
    })
}

/// Locale conventions used when rendering numbers. Defaults to en-US.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLocale {
    pub decimal: String,
    pub thousands: String,
    /// Group sizes from the right; the last size repeats
    pub grouping: Vec<usize>,
    pub currency_prefix: String,
    pub currency_suffix: String,
    pub minus: String,
    pub percent: String,
    pub nan: String,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            decimal: ".".to_string(),
            thousands: ",".to_string(),
            grouping: vec![3],
            currency_prefix: "$".to_string(),
            currency_suffix: String::new(),
            minus: "-".to_string(),
            percent: "%".to_string(),
            nan: "NaN".to_string(),
        }
    }
}

impl NumberLocale {
    /// Insert thousands separators into a run of digits.
    ///
    /// With a `width`, grouping stops once the grouped text reaches it; this
    /// is how zero padding gets separators without growing past the width.
    fn group(&self, value: &str, width: Option<usize>) -> String {
        if self.grouping.is_empty() {
            return value.to_string();
        }
        let chars: Vec<char> = value.chars().collect();
        let width = width.unwrap_or(usize::MAX);
        let mut parts: Vec<String> = Vec::new();
        let mut i = chars.len();
        let mut j = 0;
        let mut g = self.grouping[0];
        let mut length = 0usize;

        while i > 0 && g > 0 {
            if length.saturating_add(g + 1) > width {
                g = width.saturating_sub(length).max(1);
            }
            let start = i.saturating_sub(g);
            parts.push(chars[start..i].iter().collect());
            i = start;
            length = length.saturating_add(g + 1);
            if length > width {
                break;
            }
            j = (j + 1) % self.grouping.len();
            g = self.grouping[j];
        }

        parts.reverse();
        parts.join(&self.thousands)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Parens,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatType {
    Exponent,
    Fixed,
    General,
    Rounded,
    SiPrefix,
    Percent,
    PercentRounded,
    Decimal,
    Binary,
    Octal,
    HexLower,
    HexUpper,
    Char,
}

impl FormatType {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'e' => FormatType::Exponent,
            'f' => FormatType::Fixed,
            'g' => FormatType::General,
            'r' => FormatType::Rounded,
            's' => FormatType::SiPrefix,
            '%' => FormatType::Percent,
            'p' => FormatType::PercentRounded,
            'd' => FormatType::Decimal,
            'b' => FormatType::Binary,
            'o' => FormatType::Octal,
            'x' => FormatType::HexLower,
            'X' => FormatType::HexUpper,
            'c' => FormatType::Char,
            _ => return None,
        })
    }

    fn is_radix(self) -> bool {
        matches!(
            self,
            FormatType::Binary | FormatType::Octal | FormatType::HexLower | FormatType::HexUpper
        )
    }

    fn significant_precision(self) -> bool {
        matches!(
            self,
            FormatType::General
                | FormatType::PercentRounded
                | FormatType::Rounded
                | FormatType::SiPrefix
        )
    }

    /// Types whose output may carry a decimal point or unit that has to stay out of grouping.
    fn may_have_suffix(self) -> bool {
        matches!(
            self,
            FormatType::Decimal
                | FormatType::Exponent
                | FormatType::Fixed
                | FormatType::General
                | FormatType::PercentRounded
                | FormatType::Rounded
                | FormatType::SiPrefix
                | FormatType::Percent
        )
    }

    /// Format a non-negative value. Returns the digits and, for SI, the chosen prefix exponent.
    fn apply(self, x: f64, precision: usize) -> (String, i32) {
        if !x.is_finite() {
            return ("Infinity".to_string(), 0);
        }
        let text = match self {
            FormatType::Exponent => to_exponential(x, precision),
            FormatType::Fixed => to_fixed(x, precision),
            FormatType::General => to_precision(x, precision),
            FormatType::Rounded => format_rounded(x, precision),
            FormatType::SiPrefix => return format_prefix_auto(x, precision),
            FormatType::Percent => to_fixed(x * 100.0, precision),
            FormatType::PercentRounded => format_rounded(x * 100.0, precision),
            FormatType::Decimal => format!("{:.0}", round_half_up(x)),
            FormatType::Binary => to_radix(x, 2),
            FormatType::Octal => to_radix(x, 8),
            FormatType::HexLower => to_radix(x, 16),
            FormatType::HexUpper => to_radix(x, 16).to_uppercase(),
            FormatType::Char => js_number_string(x),
        };
        (text, 0)
    }
}

/// A parsed d3-format specifier bound to a locale.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    spec: String,
    fill: char,
    align: Align,
    sign: Sign,
    zero: bool,
    width: usize,
    comma: bool,
    precision: usize,
    trim: bool,
    kind: FormatType,
    prefix: String,
    suffix: String,
    locale: NumberLocale,
}

impl NumberFormat {
    /// Parse a specifier using the en-US locale.
    pub fn parse(spec: &str) -> Result<Self> {
        Self::parse_with_locale(spec, &NumberLocale::default())
    }

    pub fn parse_with_locale(spec: &str, locale: &NumberLocale) -> Result<Self> {
        let caps = specifier_regex()
            .captures(spec)
            .ok_or_else(|| eyre!("invalid format: {}", spec))?;
        let text = |i: usize| caps.get(i).map(|m| m.as_str());

        let mut fill = text(1).and_then(|s| s.chars().next()).unwrap_or(' ');
        let mut align = match text(2) {
            Some("<") => Align::Left,
            Some("^") => Align::Center,
            Some("=") => Align::AfterSign,
            _ => Align::Right,
        };
        let sign = match text(3) {
            Some("+") => Sign::Plus,
            Some("(") => Sign::Parens,
            Some(" ") => Sign::Space,
            _ => Sign::Minus,
        };
        let symbol = text(4);
        let mut zero = text(5).is_some();
        let width = match text(6) {
            Some(w) => w
                .parse::<usize>()
                .ok()
                .filter(|w| *w <= MAX_WIDTH)
                .ok_or_else(|| eyre!("invalid format: {} (width out of range)", spec))?,
            None => 0,
        };
        let mut comma = text(7).is_some();
        let mut precision = match text(8) {
            Some(p) => Some(
                p[1..]
                    .parse::<usize>()
                    .map_err(|_| eyre!("invalid format: {} (precision out of range)", spec))?,
            ),
            None => None,
        };
        let mut trim = text(9).is_some();
        let type_char = text(10).and_then(|s| s.chars().next());

        let kind = match (type_char, type_char.and_then(FormatType::from_char)) {
            (Some('n'), _) => {
                comma = true;
                FormatType::General
            }
            (_, Some(kind)) => kind,
            _ => {
                precision.get_or_insert(12);
                trim = true;
                FormatType::General
            }
        };

        if zero || (fill == '0' && align == Align::AfterSign) {
            zero = true;
            fill = '0';
            align = Align::AfterSign;
        }

        let prefix = match symbol {
            Some("$") => locale.currency_prefix.clone(),
            Some("#") if kind.is_radix() => {
                format!("0{}", type_char.unwrap_or('x').to_ascii_lowercase())
            }
            _ => String::new(),
        };
        let suffix = if symbol == Some("$") {
            locale.currency_suffix.clone()
        } else if matches!(kind, FormatType::Percent | FormatType::PercentRounded) {
            locale.percent.clone()
        } else {
            String::new()
        };

        let precision = match precision {
            None => 6,
            Some(p) if kind.significant_precision() => p.clamp(1, 21),
            Some(p) => p.min(20),
        };

        Ok(Self {
            spec: spec.to_string(),
            fill,
            align,
            sign,
            zero,
            width,
            comma,
            precision,
            trim,
            kind,
            prefix,
            suffix,
            locale: locale.clone(),
        })
    }

    /// The specifier this format was parsed from.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn format(&self, value: f64) -> String {
        let mut value_prefix = self.prefix.clone();
        let mut value_suffix = self.suffix.clone();
        let mut body;

        if self.kind == FormatType::Char {
            value_suffix = format!("{}{}", js_number_string(value), value_suffix);
            body = String::new();
        } else {
            let mut negative = value < 0.0 || (value == 0.0 && value.is_sign_negative());
            let mut prefix_exponent = 0;
            body = if value.is_nan() {
                self.locale.nan.clone()
            } else {
                let (text, exponent) = self.kind.apply(value.abs(), self.precision);
                prefix_exponent = exponent;
                text
            };
            if self.trim {
                body = format_trim(&body);
            }

            // A negative value that rounds to zero loses its sign unless `+` was asked for
            if negative && body.parse::<f64>() == Ok(0.0) && self.sign != Sign::Plus {
                negative = false;
            }

            let sign_text = if negative {
                if self.sign == Sign::Parens {
                    "(".to_string()
                } else {
                    self.locale.minus.clone()
                }
            } else {
                match self.sign {
                    Sign::Plus => "+".to_string(),
                    Sign::Space => " ".to_string(),
                    Sign::Minus | Sign::Parens => String::new(),
                }
            };
            value_prefix = format!("{}{}", sign_text, value_prefix);

            let si = if self.kind == FormatType::SiPrefix {
                SI_PREFIXES[(8 + prefix_exponent / 3) as usize]
            } else {
                ""
            };
            let close = if negative && self.sign == Sign::Parens {
                ")"
            } else {
                ""
            };
            value_suffix = format!("{}{}{}", si, value_suffix, close);

            if self.kind.may_have_suffix() {
                if let Some(i) = body.find(|c: char| !c.is_ascii_digit()) {
                    let tail = if body[i..].starts_with('.') {
                        format!("{}{}", self.locale.decimal, &body[i + 1..])
                    } else {
                        body[i..].to_string()
                    };
                    value_suffix = format!("{}{}", tail, value_suffix);
                    body.truncate(i);
                }
            }
        }

        if self.comma && !self.zero {
            body = self.locale.group(&body, None);
        }

        let length =
            value_prefix.chars().count() + body.chars().count() + value_suffix.chars().count();
        let mut padding: String = if length < self.width {
            std::iter::repeat(self.fill)
                .take(self.width - length)
                .collect()
        } else {
            String::new()
        };

        if self.comma && self.zero {
            let width = if padding.is_empty() {
                None
            } else {
                Some(self.width.saturating_sub(value_suffix.chars().count()))
            };
            body = self.locale.group(&format!("{}{}", padding, body), width);
            padding.clear();
        }

        match self.align {
            Align::Left => format!("{}{}{}{}", value_prefix, body, value_suffix, padding),
            Align::AfterSign => format!("{}{}{}{}", value_prefix, padding, body, value_suffix),
            Align::Center => {
                let pad: Vec<char> = padding.chars().collect();
                let half = pad.len() / 2;
                let before: String = pad[..half].iter().collect();
                let after: String = pad[half..].iter().collect();
                format!("{}{}{}{}{}", before, value_prefix, body, value_suffix, after)
            }
            Align::Right => format!("{}{}{}{}", padding, value_prefix, body, value_suffix),
        }
    }
}

impl FromStr for NumberFormat {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Leading decimal digits of `x` (finite, > 0) and the base-10 exponent of the first one.
///
/// Returns at least `count + GUARD_DIGITS` digits, unrounded at `count`.
fn raw_digits(x: f64, count: usize) -> (Vec<u8>, i32) {
    let s = format!("{:.*e}", count + GUARD_DIGITS, x);
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let digits = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    (digits, exponent.parse().unwrap_or(0))
}

/// Keep `keep` digits, rounding half up on the remaining tail.
///
/// A carry out of the first digit yields a leading `1` and bumps the exponent.
fn round_digits(digits: &[u8], exponent: i32, keep: usize) -> (Vec<u8>, i32) {
    let mut head: Vec<u8> = digits.iter().take(keep).copied().collect();
    if digits.get(keep).is_some_and(|d| *d >= b'5') {
        let mut i = head.len();
        loop {
            if i == 0 {
                head.insert(0, b'1');
                return (head, exponent + 1);
            }
            i -= 1;
            if head[i] == b'9' {
                head[i] = b'0';
            } else {
                head[i] += 1;
                break;
            }
        }
    }
    (head, exponent)
}

/// Exactly `sig` significant digits of `x` and the exponent of the first one.
fn decimal_parts(x: f64, sig: usize) -> (String, i32) {
    if x == 0.0 {
        return ("0".repeat(sig.max(1)), 0);
    }
    if sig == 0 {
        // Shortest round-trip digits
        let s = format!("{:e}", x);
        let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
        let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
        return (digits, exponent.parse().unwrap_or(0));
    }
    let (digits, exponent) = raw_digits(x, sig);
    let (mut head, exponent) = round_digits(&digits, exponent, sig);
    head.truncate(sig);
    (String::from_utf8_lossy(&head).into_owned(), exponent)
}

/// Lay out digits (first digit at 10^exponent) as a plain decimal with `frac` fraction digits.
fn positional(digits: &[u8], exponent: i32, frac: usize) -> String {
    let frac = frac as i32;
    let mut out = String::new();
    let mut p = exponent.max(0);
    while p >= -frac {
        if p == -1 {
            out.push('.');
        }
        let idx = exponent - p;
        let d = if idx >= 0 && (idx as usize) < digits.len() {
            digits[idx as usize]
        } else {
            b'0'
        };
        out.push(d as char);
        p -= 1;
    }
    out
}

/// `Number.prototype.toFixed`
fn to_fixed(x: f64, frac: usize) -> String {
    if x >= 1e21 {
        return js_number_string(x);
    }
    if x == 0.0 {
        return positional(&[], 0, frac);
    }
    let (_, e0) = raw_digits(x, 1);
    let keep = e0 + 1 + frac as i32;
    if keep < 0 {
        return positional(&[], 0, frac);
    }
    let (digits, exponent) = raw_digits(x, keep as usize);
    let (head, exponent) = round_digits(&digits, exponent, keep as usize);
    positional(&head, exponent, frac)
}

fn exponent_form(digits: &str, exponent: i32) -> String {
    let (first, rest) = digits.split_at(1);
    let sign = if exponent < 0 { '-' } else { '+' };
    if rest.is_empty() {
        format!("{}e{}{}", first, sign, exponent.abs())
    } else {
        format!("{}.{}e{}{}", first, rest, sign, exponent.abs())
    }
}

/// `Number.prototype.toExponential`
fn to_exponential(x: f64, frac: usize) -> String {
    let (digits, exponent) = decimal_parts(x, frac + 1);
    exponent_form(&digits, exponent)
}

/// `Number.prototype.toPrecision`
fn to_precision(x: f64, precision: usize) -> String {
    let (digits, exponent) = decimal_parts(x, precision);
    if exponent < -6 || exponent >= precision as i32 {
        return exponent_form(&digits, exponent);
    }
    if exponent >= 0 {
        let split = exponent as usize + 1;
        let (int, frac) = digits.split_at(split.min(digits.len()));
        if frac.is_empty() {
            int.to_string()
        } else {
            format!("{}.{}", int, frac)
        }
    } else {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    }
}

/// d3 `r`: `precision` significant digits, never in exponent form.
fn format_rounded(x: f64, precision: usize) -> String {
    let (digits, exponent) = decimal_parts(x, precision);
    if exponent < 0 {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    } else if digits.len() > exponent as usize + 1 {
        let (int, frac) = digits.split_at(exponent as usize + 1);
        format!("{}.{}", int, frac)
    } else {
        format!(
            "{}{}",
            digits,
            "0".repeat(exponent as usize + 1 - digits.len())
        )
    }
}

/// d3 `s`: significant digits scaled to the nearest SI prefix.
fn format_prefix_auto(x: f64, precision: usize) -> (String, i32) {
    let (digits, exponent) = decimal_parts(x, precision);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8) * 3;
    let i = exponent - prefix_exponent + 1;
    let n = digits.len() as i32;
    let text = if i == n {
        digits
    } else if i > n {
        format!("{}{}", digits, "0".repeat((i - n) as usize))
    } else if i > 0 {
        let (int, frac) = digits.split_at(i as usize);
        format!("{}.{}", int, frac)
    } else {
        let (more, _) = decimal_parts(x, (precision as i32 + i - 1).max(0) as usize);
        format!("0.{}{}", "0".repeat((1 - i) as usize), more)
    };
    (text, prefix_exponent)
}

/// `Math.round` for non-negative input.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn to_radix(x: f64, radix: u32) -> String {
    let r = round_half_up(x);
    if r >= 2f64.powi(127) {
        return format!("{:.0}", r);
    }
    let n = r as u128;
    match radix {
        2 => format!("{:b}", n),
        8 => format!("{:o}", n),
        _ => format!("{:x}", n),
    }
}

/// Drop insignificant trailing zeros of the fraction, and the point if nothing remains.
fn format_trim(s: &str) -> String {
    let Some(dot) = s.find('.') else {
        return s.to_string();
    };
    let end = s[dot + 1..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| dot + 1 + i)
        .unwrap_or(s.len());
    let fraction = s[dot + 1..end].trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}{}", &s[..dot], &s[end..])
    } else {
        format!("{}.{}{}", &s[..dot], fraction, &s[end..])
    }
}
