use crate::errors::KitError;
use chrono::{DateTime, FixedOffset, Local, Offset};

/// Largest UTC offset accepted from the local clock
const MAX_OFFSET_SECONDS: i32 = 12 * 3600;

/// Author, committer or tagger of an object
///
/// Serialized as `Name <email> <unix-seconds> <+HHMM>`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Identity {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Identity {
    pub fn new(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Identity {
            name,
            email,
            timestamp,
        }
    }

    /// Identity stamped with the current time in the local offset
    pub fn now(name: String, email: String) -> Self {
        let now = Local::now();
        let offset_seconds = now
            .offset()
            .fix()
            .local_minus_utc()
            .clamp(-MAX_OFFSET_SECONDS, MAX_OFFSET_SECONDS);
        let offset = FixedOffset::east_opt(offset_seconds).unwrap_or_else(|| now.offset().fix());

        Self::new(name, email, now.with_timezone(&offset))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// `Name <email>`
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// The serialized form used on `author`, `committer` and `tagger` lines
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Format timestamp in human-readable form, like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let (sign, digits) = match offset.as_bytes().first()? {
        b'+' => (1, &offset[1..]),
        b'-' => (-1, &offset[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl TryFrom<&str> for Identity {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || KitError::BadObject(format!("invalid identity line: {value}"));

        // Split from right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(invalid().into());
        }

        let offset = parse_offset(parts[0]).ok_or_else(invalid)?;
        let seconds = parts[1].parse::<i64>().map_err(|_| invalid())?;
        let name_email = parts[2];

        let email_start = name_email.find('<').ok_or_else(invalid)?;
        let email_end = name_email.rfind('>').ok_or_else(invalid)?;
        if email_end < email_start {
            return Err(invalid().into());
        }

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let timestamp = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(invalid)?
            .with_timezone(&offset);

        Ok(Identity::new(name, email, timestamp))
    }
}
