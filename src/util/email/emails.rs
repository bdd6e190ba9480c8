pub const POST_SHARE_EMAIL: &str = include_str!("./post_share.html");

/// Recommendation email sent when a reader shares a post. Placeholders:
/// $1 sender name, $2 post title, $3 absolute post link, $4 optional note.
pub struct PostShareEmail {
    pub email: String,
}

impl Default for PostShareEmail {
    fn default() -> Self {
        Self::new()
    }
}

impl PostShareEmail {
    pub fn new() -> Self {
        PostShareEmail {
            email: POST_SHARE_EMAIL.to_string(),
        }
    }

    pub fn set_sender_name(mut self, sender_name: &str) -> Self {
        self.email = self.email.replace("$1", sender_name);
        self
    }

    pub fn set_post_title(mut self, post_title: &str) -> Self {
        self.email = self.email.replace("$2", post_title);
        self
    }

    pub fn set_post_link(mut self, link: &str) -> Self {
        self.email = self.email.replace("$3", link);
        self
    }

    pub fn set_note(mut self, note: &str) -> Self {
        self.email = self.email.replace("$4", note);
        self
    }

    pub fn to_message(
        self,
        from_address: &str,
        recipient_email: &str,
        subject: &str,
    ) -> anyhow::Result<lettre::Message> {
        Ok(lettre::Message::builder()
            .from(from_address.parse()?)
            .to(recipient_email.parse()?)
            .subject(subject)
            .header(lettre::message::header::ContentType::TEXT_HTML)
            .body(self.email)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let email = PostShareEmail::new()
            .set_sender_name("Ada")
            .set_post_title("On Engines")
            .set_post_link("https://blog.example.com/2024/1/2/on-engines")
            .set_note("thought of you");

        assert!(email.email.contains("Ada"));
        assert!(email.email.contains("On Engines"));
        assert!(
            email
                .email
                .contains("https://blog.example.com/2024/1/2/on-engines")
        );
        assert!(!email.email.contains("$1"));
        assert!(!email.email.contains("$4"));
    }

    #[test]
    fn builds_a_message_for_valid_addresses() {
        let message = PostShareEmail::new()
            .set_sender_name("Ada")
            .set_post_title("On Engines")
            .set_post_link("https://blog.example.com/p")
            .set_note("")
            .to_message(
                "Blog <donotreply@blog.example.com>",
                "reader@example.com",
                "Ada recommends you read On Engines",
            );
        assert!(message.is_ok());
    }
}
