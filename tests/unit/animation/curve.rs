use super::*;

#[test]
fn linear_interpolates_and_clamps() {
    assert_eq!(linear(0, 10, 20, 0.0, 1.0, true), 0.0);
    assert_eq!(linear(10, 10, 20, 0.0, 1.0, true), 0.0);
    assert!((linear(15, 10, 20, 0.0, 1.0, true) - 0.5).abs() < 1e-12);
    assert_eq!(linear(40, 10, 20, 0.0, 1.0, true), 1.0);
}

#[test]
fn linear_extrapolates_forward_only_when_unclamped() {
    assert!((linear(30, 10, 20, 0.0, 1.0, false) - 2.0).abs() < 1e-12);
    // Before the window the start value wins even unclamped.
    assert_eq!(linear(2, 10, 20, 5.0, 1.0, false), 5.0);
}

#[test]
fn linear_degenerate_window_is_a_step() {
    assert_eq!(linear(9, 10, 10, 0.0, 1.0, true), 0.0);
    assert_eq!(linear(10, 10, 10, 0.0, 1.0, true), 1.0);
    assert_eq!(linear(11, 10, 4, 0.0, 1.0, true), 1.0);
}

#[test]
fn spring_is_zero_before_start_and_monotonic_after() {
    assert_eq!(spring_approach(0, 30, 12.0, 1.0), 0.0);
    assert_eq!(spring_approach(30, 30, 12.0, 1.0), 0.0);

    let mut prev = 0.0;
    for f in 30..200 {
        let v = spring_approach(f, 30, 12.0, 1.0);
        assert!(v >= prev, "spring regressed at frame {f}");
        assert!((0.0..=1.0).contains(&v));
        prev = v;
    }
    assert!(prev > 0.99);
}

#[test]
fn spring_survives_bad_parameters() {
    for (damping, mass) in [(0.0, 1.0), (12.0, 0.0), (f64::NAN, 1.0), (12.0, f64::INFINITY)] {
        let v = spring_approach(60, 30, damping, mass);
        assert!(v.is_finite());
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn typed_reveal_matches_reference_scenario() {
    assert_eq!(typed_reveal(45, 45, 0.6, "Hello"), "");
    assert_eq!(typed_reveal(53, 45, 0.6, "Hello"), "Hell");
    assert_eq!(typed_reveal(500, 45, 0.6, "Hello"), "Hello");
    assert_eq!(typed_reveal(10, 45, 0.6, "Hello"), "");
}

#[test]
fn typed_reveal_is_monotonic_and_bounded() {
    let text = "Working with them doubled our pipeline.";
    let mut prev = 0;
    for f in 0..400 {
        let shown = typed_reveal(f, 45, 0.6, text);
        assert!(text.starts_with(shown));
        assert!(shown.len() >= prev);
        assert!(shown.len() <= text.len());
        prev = shown.len();
    }
}

#[test]
fn typed_reveal_respects_char_boundaries() {
    let text = "héllo wörld";
    assert_eq!(typed_reveal(2, 0, 1.0, text), "hé");
    assert_eq!(typed_reveal(9, 0, 1.0, text), "héllo wör");
}

#[test]
fn typed_reveal_empty_text_and_bad_speed() {
    assert_eq!(typed_reveal(1000, 0, 0.6, ""), "");
    assert_eq!(typed_reveal(1000, 0, 0.0, "abc"), "");
    assert_eq!(typed_reveal(1000, 0, f64::NAN, "abc"), "");
}

#[test]
fn integer_products_do_not_drop_a_char() {
    // 5 * 0.6 == 3 exactly in decimal; must reveal three chars.
    assert_eq!(revealed_char_count(5, 0, 0.6), 3);
    assert_eq!(revealed_char_count(10, 0, 0.3), 3);
}

#[test]
fn helpers_compose_primitives() {
    assert_eq!(fade_opacity(0, 0, 20, Ease::Linear), 0.0);
    assert!((fade_opacity(10, 0, 20, Ease::Linear) - 0.5).abs() < 1e-12);
    assert_eq!(fade_opacity(25, 0, 20, Ease::OutQuad), 1.0);

    assert_eq!(scale_from_spring(30, 30, 0.8, 12.0, 1.0), 0.8);
    assert!(scale_from_spring(120, 30, 0.8, 12.0, 1.0) > 0.99);

    let off = translate_from_spring(30, 30, Vec2::new(0.0, 40.0), 12.0, 1.0);
    assert_eq!(off, Vec2::new(0.0, 40.0));
    let off = translate_from_spring(200, 30, Vec2::new(0.0, 40.0), 12.0, 1.0);
    assert!(off.y.abs() < 0.5);
}
