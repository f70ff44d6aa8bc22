use serde::{Deserialize, Serialize};

/// Separator between the positional fields of a forwarded SMS.
pub const DELIMITER: &str = "##";

/// The semantic slots of a forwarded SMS. Absent slots are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFields {
    pub time: String,
    pub from: String,
    pub country: String,
    pub to: String,
    pub text: String,
}

/// Splits `time##from##country##to##text`. Everything after the fourth
/// delimiter belongs to `text`, delimiters included.
pub fn decompose(message: &str) -> MessageFields {
    if message.is_empty() {
        return MessageFields::default();
    }

    let mut parts = message.splitn(5, DELIMITER);
    let mut next = || parts.next().unwrap_or_default().to_string();

    MessageFields {
        time: next(),
        from: next(),
        country: next(),
        to: next(),
        text: next(),
    }
}
