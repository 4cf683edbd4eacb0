use md5::{Digest, Md5};

const GRAVATAR_BASE_URL: &str = "http://www.gravatar.com/avatar/";
const GRAVATAR_DEFAULT_STYLE: &str = "?d=wavatar";

/// Derives a Gravatar URL from an email address.
///
/// The digest covers the email bytes exactly as given. Gravatar itself
/// expects a trimmed lower-cased address; existing avatars depend on this
/// input, so it must not be normalized here.
pub fn avatar_url(email: &str) -> String {
    format!(
        "{}{}{}",
        GRAVATAR_BASE_URL,
        md5_hex(email),
        GRAVATAR_DEFAULT_STYLE
    )
}

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}
