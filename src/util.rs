use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const TAG_SLUG_PREFIX: &str = "tags/";
pub const HOME_SLUG: &str = "index";

pub fn normalize_slug(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        HOME_SLUG.to_owned()
    } else {
        trimmed.to_owned()
    }
}

pub fn tag_slug(tag: &str) -> String {
    format!("{TAG_SLUG_PREFIX}{}", tag.trim())
}

pub fn is_tag_slug(slug: &str) -> bool {
    slug.starts_with(TAG_SLUG_PREFIX)
}

pub fn leaf_name(slug: &str) -> &str {
    slug.rsplit('/').next().unwrap_or(slug)
}

/// Maps a name onto one of five lightness buckets (1..=5) with a 32-bit
/// multiply-by-31 rolling hash over UTF-16 code units.
pub fn hash_bucket(name: &str) -> u32 {
    let mut hash = 0i32;
    for unit in name.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs() % 5 + 1
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_slug_trims_slashes_and_maps_root() {
        assert_eq!(normalize_slug("/skill-tree/chat-ai/"), "skill-tree/chat-ai");
        assert_eq!(normalize_slug("/"), "index");
        assert_eq!(normalize_slug(""), "index");
    }

    #[test]
    fn hash_bucket_stays_in_range_and_is_stable() {
        for name in ["chatgpt", "claude", "", "画像生成", "a-very-long-file-name-with-dashes"] {
            let bucket = hash_bucket(name);
            assert!((1..=5).contains(&bucket), "{name} -> {bucket}");
            assert_eq!(bucket, hash_bucket(name));
        }
    }

    #[test]
    fn hash_bucket_matches_reference_values() {
        // "ab" = 97 * 31 + 98 = 3105, 3105 % 5 + 1 = 1
        assert_eq!(hash_bucket("ab"), 1);
        // "abc" = 3105 * 31 + 99 = 96354, 96354 % 5 + 1 = 5
        assert_eq!(hash_bucket("abc"), 5);
    }

    #[test]
    fn leaf_name_returns_last_segment() {
        assert_eq!(leaf_name("skill-tree/chat-ai/chatgpt"), "chatgpt");
        assert_eq!(leaf_name("index"), "index");
    }
}
