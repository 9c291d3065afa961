use std::sync::OnceLock;

use regex::Regex;

static CONTINUOUS_GUIA: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)] // Static pattern: failing to compile is a programming error
fn continuous_guia() -> &'static Regex {
    CONTINUOUS_GUIA.get_or_init(|| {
        Regex::new(r"^([0-9]{3})([0-9]{2})([0-9]{2})([A-Za-z]+)([0-9]+)$")
            .expect("compile CONTINUOUS_GUIA")
    })
}

/// Reformat a continuous guía code into its dashed form.
///
/// `3351720CC3589` becomes `335-17-20-CC-3589`, with the letter run
/// upper-cased. Anything that does not match the continuous shape (including
/// codes that are already dashed) is returned unchanged, so the function is
/// total and idempotent.
pub fn normalize(token: &str) -> String {
    let Some(caps) = continuous_guia().captures(token) else {
        return token.to_string();
    };

    format!(
        "{}-{}-{}-{}-{}",
        &caps[1],
        &caps[2],
        &caps[3],
        caps[4].to_uppercase(),
        &caps[5]
    )
}

/// Whether a token is already in canonical dashed form.
pub fn is_dashed(token: &str) -> bool {
    token.contains('-')
}
