use datacards_lib::{hex_to_hsl_triple, hsl_triple_to_hex, Hsl, Rgb};
use proptest::prelude::*;

#[test]
fn test_primary_colors() {
    assert_eq!(hex_to_hsl_triple("#ff0000"), "0 100% 50%");
    assert_eq!(hex_to_hsl_triple("#ffffff"), "0 0% 100%");
    assert_eq!(hex_to_hsl_triple("#000000"), "0 0% 0%");
    assert_eq!(hsl_triple_to_hex(Some("0 100% 50%")), "#ff0000");
    assert_eq!(hsl_triple_to_hex(Some("120 100% 25%")), "#008000");
}

#[test]
fn test_preset_color_round_trip() {
    assert_eq!(hex_to_hsl_triple("#18181b"), "240 5.9% 10%");
    assert_eq!(hsl_triple_to_hex(Some("240 5.9% 10%")), "#18181b");
}

#[test]
fn test_short_hex_and_missing_triple() {
    assert_eq!(hex_to_hsl_triple("#f00"), "0 100% 50%");
    assert_eq!(hsl_triple_to_hex(None), "#000000");
    assert_eq!(hsl_triple_to_hex(Some("")), "#000000");
    assert!(Rgb::from_hex("#12345").is_err());
    assert!(Hsl::from_triple("1 2% 3% 4%").is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn hex_survives_hsl_round_trip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let hex = Rgb::new(r, g, b).to_hex();
        let back = Rgb::from_hex(&hsl_triple_to_hex(Some(&hex_to_hsl_triple(&hex)))).unwrap();
        prop_assert!((i16::from(back.r) - i16::from(r)).abs() <= 1, "{} -> {}", hex, back.to_hex());
        prop_assert!((i16::from(back.g) - i16::from(g)).abs() <= 1, "{} -> {}", hex, back.to_hex());
        prop_assert!((i16::from(back.b) - i16::from(b)).abs() <= 1, "{} -> {}", hex, back.to_hex());
    }

    #[test]
    fn triple_components_are_in_range(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let hsl = Hsl::from_triple(&Rgb::new(r, g, b).to_hsl().to_triple()).unwrap();
        prop_assert!((0.0..360.0).contains(&hsl.h));
        prop_assert!((0.0..=100.0).contains(&hsl.s));
        prop_assert!((0.0..=100.0).contains(&hsl.l));
    }
}
