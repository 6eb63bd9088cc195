use validator::ValidateEmail;

/// An address the mail transport will accept. Provider data is only trimmed,
/// the casing it arrives with is what goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEmail(String);

impl RecipientEmail {
    pub fn parse(s: String) -> Result<RecipientEmail, String> {
        let trimmed = s.trim();
        if trimmed.validate_email() {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(format!("{s:?} is not a valid recipient email."))
        }
    }
}

impl AsRef<str> for RecipientEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipientEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
