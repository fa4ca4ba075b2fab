use gallery_core::catalog::Photo;
use gallery_core::resolve::ImageSourceResolver;
use gallery_core::viewer::{NavigationController, ViewerState};
use gallery_core::{Variant, Vec2, ViewerConfig};

fn photos(names: &[&str]) -> Vec<Photo> {
    names.iter().map(|name| Photo::new(format!("album/{name}.jpg"), format!("{name}.jpg"))).collect()
}

fn state(count: usize) -> ViewerState {
    let names: Vec<String> = (0..count).map(|i| format!("p{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut state = ViewerState::new(&ViewerConfig::default());
    state.set_photos(photos(&refs));
    state
}

#[test]
fn next_n_times_returns_to_start() {
    for count in 1..=6 {
        for start in 0..count {
            let mut state = state(count);
            assert!(state.open(start));
            for _ in 0..count {
                state.next();
            }
            assert_eq!(state.current_index(), Some(start), "n={count} start={start}");
        }
    }
}

#[test]
fn previous_and_next_are_inverse() {
    for count in 1..=5 {
        for start in 0..count {
            let mut state = state(count);
            state.open(start);
            state.previous();
            state.next();
            assert_eq!(state.current_index(), Some(start));
            state.next();
            state.previous();
            assert_eq!(state.current_index(), Some(start));
        }
    }
}

#[test]
fn three_photo_scenario() {
    let mut state = ViewerState::new(&ViewerConfig::default());
    state.set_photos(photos(&["A", "B", "C"]));
    state.open(0);

    state.previous();
    assert_eq!(state.current_index(), Some(2));
    state.next();
    state.next();
    assert_eq!(state.current_index(), Some(1));
    assert_eq!(state.current_photo().map(|p| p.name.as_str()), Some("B.jpg"));
}

#[test]
fn double_toggle_restores_variant_and_mode() {
    let mut state = state(3);
    let mut resolver = ImageSourceResolver::new("http://nas.local");
    let mut nav = NavigationController::new();
    let opened = nav.open(&mut state, &mut resolver, 1, 1_000).expect("open");

    nav.toggle_original(&mut state, &mut resolver, 2_000).expect("toggle on");
    assert!(state.is_original_mode());
    let back = nav.toggle_original(&mut state, &mut resolver, 3_000).expect("toggle off");

    assert!(!state.is_original_mode());
    assert_eq!(state.viewer_variant(), Variant::Preview);
    assert_eq!(back.key, opened.key);
}

#[test]
fn reset_zoom_postconditions_hold_from_any_state() {
    let mut state = state(2);
    state.open(0);

    state.set_zoom(1.2, Some(Vec2::new(40.0, -25.0)));
    state.begin_drag();
    state.drag_to(Vec2::new(300.0, 120.0));
    state.pinch_zoom(4.0);
    state.reset_zoom();

    assert_eq!(state.scale(), 1.0);
    assert_eq!(state.pan_offset(), Vec2::ZERO);
    assert!(!state.is_dragging_enabled());
    assert!(!state.is_dragging());
}

#[test]
fn navigation_resets_zoom_but_keeps_original_mode() {
    let mut state = state(3);
    let mut resolver = ImageSourceResolver::new("");
    let mut nav = NavigationController::new();
    nav.open(&mut state, &mut resolver, 0, 0);
    nav.toggle_original(&mut state, &mut resolver, 0);
    state.toggle_zoom();
    assert!(state.scale() > 1.0);

    let request = nav.next(&mut state, &mut resolver, 0).expect("next");
    assert_eq!(state.scale(), 1.0);
    assert!(state.is_original_mode());
    assert_eq!(request.key.variant, Variant::Original);
    assert!(request.image_url.starts_with("/api/photo/"));
    assert!(request.metadata_url.is_some());
}

#[test]
fn out_of_range_and_empty_are_ignored() {
    let mut empty = state(0);
    let mut resolver = ImageSourceResolver::new("");
    let mut nav = NavigationController::new();
    assert!(nav.open(&mut empty, &mut resolver, 0, 0).is_none());
    assert!(nav.next(&mut empty, &mut resolver, 0).is_none());

    let mut two = state(2);
    assert!(nav.go_to(&mut two, &mut resolver, 2, 0).is_none());
    assert_eq!(two.current_index(), None);
}
