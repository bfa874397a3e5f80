use std::str::FromStr;
use std::time::Duration;

/// Durations written like `90`, `2m`, or `1h15m30s`. A bare number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| format!("Duration too large: {}", s))?;
                current_number.clear();
                has_value = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}
