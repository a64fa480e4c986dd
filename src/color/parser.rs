//! Parser for the textual color formats accepted over the API.
//!
//! Accepts `#RGB`, `#RRGGBB`, `rgb(r, g, b)`, `hsl(h, s%, l%)` and a handful of
//! basic color names.

use super::{Color, ColorError, Hsl};

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
];

pub(super) fn parse(input: &str) -> Result<Color, ColorError> {
    let text = input.trim().to_ascii_lowercase();

    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(input, hex);
    }
    if let Some(args) = function_args(&text, "rgb") {
        return parse_rgb(input, args);
    }
    if let Some(args) = function_args(&text, "hsl") {
        return parse_hsl(input, args);
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == text)
        .map(|(_, [r, g, b])| Color::from_rgb255(f64::from(*r), f64::from(*g), f64::from(*b)))
        .ok_or_else(|| ColorError::Unrecognized(input.to_owned()))
}

/// Strip `name(` and `)` and return what was inside.
fn function_args<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(input: &str, hex: &str) -> Result<Color, ColorError> {
    let invalid = || ColorError::InvalidHex(input.to_owned());
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let digits: Vec<u8> = match hex.len() {
        // #RGB: each digit is doubled, so "f" means "ff".
        3 => hex
            .chars()
            .map(|c| u8::from_str_radix(&format!("{}{}", c, c), 16))
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?,
        6 => (0..3)
            .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16))
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    Ok(Color::from_rgb255(
        f64::from(digits[0]),
        f64::from(digits[1]),
        f64::from(digits[2]),
    ))
}

fn components<'a>(input: &str, args: &'a str) -> Result<[&'a str; 3], ColorError> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(ColorError::Unrecognized(input.to_owned())),
    }
}

fn number(input: &str, component: &str) -> Result<f64, ColorError> {
    component
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ColorError::InvalidComponent {
            input: input.to_owned(),
            component: component.to_owned(),
        })
}

fn percentage(input: &str, component: &str) -> Result<f64, ColorError> {
    let value = number(input, component.trim_end_matches('%'))?;
    Ok(value / 100.0)
}

fn parse_rgb(input: &str, args: &str) -> Result<Color, ColorError> {
    let [red, green, blue] = components(input, args)?;
    Ok(Color::from_rgb255(
        number(input, red)?,
        number(input, green)?,
        number(input, blue)?,
    ))
}

fn parse_hsl(input: &str, args: &str) -> Result<Color, ColorError> {
    let [hue, saturation, lightness] = components(input, args)?;
    Ok(Color::from_hsl(Hsl {
        hue: number(input, hue.trim_end_matches("deg"))?,
        saturation: percentage(input, saturation)?,
        lightness: percentage(input, lightness)?,
    }))
}
