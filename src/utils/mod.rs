//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Join `segments` onto the path of `base`, percent-encoding each one.
pub fn join_segments<'a>(
    base: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> crate::error::Result<Url> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| crate::error::AppError::config(format!("'{base}' cannot be a base URL")))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments() {
        let url = join_segments("https://api.example.com/v1/", ["indexes", "Recipes"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/indexes/Recipes");

        let url = join_segments("https://api.example.com", ["a b", "c/d"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/a%20b/c%2Fd");
    }

    #[test]
    fn test_join_segments_rejects_non_base() {
        assert!(join_segments("mailto:info@example.com", ["x"]).is_err());
    }
}
