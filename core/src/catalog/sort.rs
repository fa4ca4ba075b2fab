use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Photo;

/// Gallery ordering offered by the sort selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    RatingDesc,
}

impl SortMode {
    /// Parse the selector value (`newest`, `name-asc`, ...). Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "newest" => Some(SortMode::Newest),
            "oldest" => Some(SortMode::Oldest),
            "name-asc" => Some(SortMode::NameAsc),
            "name-desc" => Some(SortMode::NameDesc),
            "rating-desc" => Some(SortMode::RatingDesc),
            _ => None,
        }
    }
}

/// Stable in-place sort of `photos` by `mode`.
pub fn sort_photos(photos: &mut [Photo], mode: SortMode) {
    match mode {
        SortMode::Newest => photos.sort_by(|a, b| b.modified.cmp(&a.modified)),
        SortMode::Oldest => photos.sort_by(|a, b| a.modified.cmp(&b.modified)),
        SortMode::NameAsc => photos.sort_by(|a, b| natural_cmp_names(&a.name, &b.name)),
        SortMode::NameDesc => photos.sort_by(|a, b| natural_cmp_names(&b.name, &a.name)),
        SortMode::RatingDesc => {
            photos.sort_by(|a, b| b.rating.unwrap_or(0).cmp(&a.rating.unwrap_or(0)))
        }
    }
}

fn natural_cmp_names(a: &str, b: &str) -> Ordering {
    natural_cmp(&a.to_lowercase(), &b.to_lowercase())
}

/// Compare strings treating digit runs as numbers (`img2` < `img10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);

    for (a_tok, b_tok) in a_tokens.iter().zip(b_tokens.iter()) {
        let ordering = match (a_tok, b_tok) {
            (Token::Number(a_digits, a_val), Token::Number(b_digits, b_val)) => {
                a_val.cmp(b_val).then_with(|| a_digits.len().cmp(&b_digits.len()))
            }
            (Token::Text(a_text), Token::Text(b_text)) => a_text.cmp(b_text),
            (Token::Number(..), Token::Text(..)) => Ordering::Less,
            (Token::Text(..), Token::Number(..)) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_tokens.len().cmp(&b_tokens.len()).then_with(|| a.cmp(b))
}

#[derive(Debug, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    Number(&'a str, u128),
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !ch.is_ascii_digit() {
            continue;
        }
        if start < idx {
            tokens.push(Token::Text(&input[start..idx]));
        }
        let mut end = idx + 1;
        while let Some(&(next_idx, next)) = chars.peek() {
            if !next.is_ascii_digit() {
                break;
            }
            chars.next();
            end = next_idx + 1;
        }
        let digits = &input[idx..end];
        tokens.push(Token::Number(digits, digits.parse::<u128>().unwrap_or(u128::MAX)));
        start = end;
    }

    if start < input.len() {
        tokens.push(Token::Text(&input[start..]));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str, modified: &str, rating: Option<u8>) -> Photo {
        let mut photo = Photo::new(format!("dir/{name}"), name);
        photo.modified = modified.to_string();
        photo.rating = rating;
        photo
    }

    fn names(photos: &[Photo]) -> Vec<&str> {
        photos.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn name_sort_is_natural_and_case_insensitive() {
        let mut photos = vec![
            photo("IMG10.jpg", "", None),
            photo("img2.jpg", "", None),
            photo("Img1.jpg", "", None),
        ];
        sort_photos(&mut photos, SortMode::NameAsc);
        assert_eq!(names(&photos), vec!["Img1.jpg", "img2.jpg", "IMG10.jpg"]);

        sort_photos(&mut photos, SortMode::NameDesc);
        assert_eq!(names(&photos), vec!["IMG10.jpg", "img2.jpg", "Img1.jpg"]);
    }

    #[test]
    fn date_and_rating_orders() {
        let mut photos = vec![
            photo("a", "2023-01-01 00:00:00", Some(1)),
            photo("b", "2024-06-01 12:00:00", None),
            photo("c", "2022-03-04 08:30:00", Some(5)),
        ];
        sort_photos(&mut photos, SortMode::Newest);
        assert_eq!(names(&photos), vec!["b", "a", "c"]);
        sort_photos(&mut photos, SortMode::Oldest);
        assert_eq!(names(&photos), vec!["c", "a", "b"]);
        sort_photos(&mut photos, SortMode::RatingDesc);
        assert_eq!(names(&photos), vec!["c", "a", "b"]);
    }

    #[test]
    fn tokenize_splits_numbers_and_text() {
        let tokens = tokenize("IMG_2041-hdr2");
        assert_eq!(
            tokens,
            vec![
                Token::Text("IMG_"),
                Token::Number("2041", 2041),
                Token::Text("-hdr"),
                Token::Number("2", 2)
            ]
        );
    }

    #[test]
    fn parses_selector_values() {
        assert_eq!(SortMode::parse("rating-desc"), Some(SortMode::RatingDesc));
        assert_eq!(SortMode::parse("random"), None);
    }
}
