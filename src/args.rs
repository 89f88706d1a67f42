//! Value parsers for comma separated geometry arguments

use perch_types::{Point, Rect, Size};

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma separated numbers, got '{value}'"));
    }

    let mut numbers = [0.0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{part}' is not a number"))?;
    }
    Ok(numbers)
}

/// `TOP,LEFT,WIDTH,HEIGHT`
pub fn parse_rect(value: &str) -> Result<Rect, String> {
    let [top, left, width, height] = parse_numbers(value)?;
    Ok(Rect::new(top, left, width, height))
}

/// `WIDTH,HEIGHT`
pub fn parse_size(value: &str) -> Result<Size, String> {
    let [width, height] = parse_numbers(value)?;
    Ok(Size::new(width, height))
}

/// `X,Y`
pub fn parse_point(value: &str) -> Result<Point, String> {
    let [x, y] = parse_numbers(value)?;
    Ok(Point::new(x, y))
}
