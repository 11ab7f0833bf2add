//! Object keys and public URLs for uploaded icons.

use crate::hash::ContentHash;

/// Remote object key for an icon: `{hash}.png`.
pub fn icon_object_key(hash: &ContentHash) -> String {
    format!("{}.png", hash.to_hex())
}

/// Public URL of an icon under the configured public domain.
///
/// Accidental double slashes from joining the domain and the key are
/// collapsed; the scheme separator is left alone.
pub fn public_icon_url(public_domain: &str, hash: &ContentHash) -> String {
    collapse_slashes(&format!("{}/{}", public_domain, icon_object_key(hash)))
}

fn collapse_slashes(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };

    let mut collapsed = String::with_capacity(url.len());
    if let Some(scheme) = scheme {
        collapsed.push_str(scheme);
        collapsed.push_str("://");
    }

    let mut previous_slash = false;
    for ch in rest.chars() {
        if ch == '/' && previous_slash {
            continue;
        }
        previous_slash = ch == '/';
        collapsed.push(ch);
    }
    collapsed
}
