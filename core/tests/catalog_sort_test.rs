use gallery_core::api::parse_listing;
use gallery_core::catalog::{Catalog, SortMode, Token, natural_cmp, sort_photos, tokenize};

#[test]
fn natural_cmp_orders_numeric_sections() {
    let names = vec!["IMG_10.jpg", "IMG_2.jpg", "IMG_1.jpg", "IMG_11.jpg"];
    let mut sorted = names.clone();
    sorted.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(sorted, vec!["IMG_1.jpg", "IMG_2.jpg", "IMG_10.jpg", "IMG_11.jpg"]);
}

#[test]
fn tokenize_splits_numbers_and_text() {
    let tokens = tokenize("DSC0042-edit3");
    assert_eq!(tokens.len(), 4);
    assert!(matches!(tokens[0], Token::Text(text) if text == "DSC"));
    assert!(matches!(tokens[1], Token::Number("0042", 42)));
    assert!(matches!(tokens[2], Token::Text("-edit")));
    assert!(matches!(tokens[3], Token::Number("3", 3)));
}

#[test]
fn resorting_a_listing_by_name_and_rating() {
    let listing = parse_listing(
        br#"{"photos": [
            {"path": "trip/img10.jpg", "name": "img10.jpg", "modified": "2024-03-01 08:00:00", "rating": 2},
            {"path": "trip/IMG2.jpg", "name": "IMG2.jpg", "modified": "2024-03-03 08:00:00"},
            {"path": "trip/img1.jpg", "name": "img1.jpg", "modified": "2024-03-02 08:00:00",
             "metadata": {"\u661f\u7ea7": 5}}
        ]}"#,
    );
    let mut catalog = Catalog::ingest("trip", listing, SortMode::Newest);
    let names = |catalog: &Catalog| -> Vec<String> {
        catalog.photos.iter().map(|photo| photo.name.clone()).collect()
    };
    assert_eq!(names(&catalog), ["IMG2.jpg", "img1.jpg", "img10.jpg"]);

    sort_photos(&mut catalog.photos, SortMode::NameAsc);
    assert_eq!(names(&catalog), ["img1.jpg", "IMG2.jpg", "img10.jpg"]);

    sort_photos(&mut catalog.photos, SortMode::RatingDesc);
    assert_eq!(names(&catalog), ["img1.jpg", "img10.jpg", "IMG2.jpg"]);

    sort_photos(&mut catalog.photos, SortMode::Oldest);
    assert_eq!(names(&catalog), ["img10.jpg", "img1.jpg", "IMG2.jpg"]);
}
