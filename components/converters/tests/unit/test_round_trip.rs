//! Native -> script -> native round trips for value types

use converters::{char16_from_script, char16_to_script, FromScript, ToScript};
use native_model::{
    DateTime, Matrix3x2, Matrix4x4, TimeSpan, Vector2, Vector3, Vector4, TICKS_PER_MILLISECOND,
};
use proptest::prelude::*;

fn round_trip<T: ToScript + FromScript>(value: &T) -> T {
    T::from_script(&value.to_script()).unwrap()
}

fn finite() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL | prop::num::f32::ZERO | prop::num::f32::SUBNORMAL
}

#[test]
fn test_boolean_round_trip() {
    assert!(round_trip(&true));
    assert!(!round_trip(&false));
}

#[test]
fn test_matrix_identity_round_trip() {
    assert_eq!(round_trip(&Matrix3x2::IDENTITY), Matrix3x2::IDENTITY);
}

proptest! {
    #[test]
    fn prop_char16_round_trip(c in any::<u16>()) {
        prop_assert_eq!(char16_from_script(&char16_to_script(c)).unwrap(), c);
    }

    #[test]
    fn prop_integer_round_trip(a in any::<i32>(), b in any::<u32>(), c in any::<i64>(), d in any::<u64>()) {
        prop_assert_eq!(round_trip(&a), a);
        prop_assert_eq!(round_trip(&b), b);
        prop_assert_eq!(round_trip(&c), c);
        prop_assert_eq!(round_trip(&d), d);
    }

    #[test]
    fn prop_date_round_trip(ms in -11_644_473_600_000_i64..253_402_300_799_000_i64) {
        let dt = DateTime::from_unix_millis(ms as f64);
        prop_assert_eq!(dt.universal_time % TICKS_PER_MILLISECOND, 0);
        prop_assert_eq!(round_trip(&dt), dt);
    }

    #[test]
    fn prop_duration_round_trip(ticks in -(1_i64 << 48)..(1_i64 << 48)) {
        let span = TimeSpan::from_ticks(ticks);
        prop_assert_eq!(round_trip(&span), span);
    }

    #[test]
    fn prop_vector_round_trip(x in finite(), y in finite(), z in finite(), w in finite()) {
        let v2 = Vector2 { x, y };
        let v3 = Vector3 { x, y, z };
        let v4 = Vector4 { x, y, z, w };
        prop_assert_eq!(round_trip(&v2), v2);
        prop_assert_eq!(round_trip(&v3), v3);
        prop_assert_eq!(round_trip(&v4), v4);
    }

    #[test]
    fn prop_matrix_round_trip(values in prop::array::uniform16(finite())) {
        let m4 = Matrix4x4::from_array(values);
        prop_assert_eq!(round_trip(&m4), m4);
        let mut six = [0.0_f32; 6];
        six.copy_from_slice(&values[..6]);
        let m3 = Matrix3x2::from_array(six);
        prop_assert_eq!(round_trip(&m3), m3);
    }
}
