//! Round-trip tests across the registry: every registered codec, both wire
//! formats, NULL and the timestamp sentinels treated as first-class values.

use chrono::{DateTime, Utc};
use pgcodec::{
    oid, Bool, Error, Float8, FormatCode, Int8, Map, ScanTarget, Text, Timestamptz, Value,
};

fn instant(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn encode(map: &Map, oid: u32, format: FormatCode, value: &Value) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    match map.encode(oid, format, value, &mut buf).unwrap() {
        pgcodec::IsNull::Yes => None,
        pgcodec::IsNull::No => Some(buf),
    }
}

#[test]
fn bool_roundtrip_both_formats() {
    let map = Map::new();
    for format in [FormatCode::Binary, FormatCode::Text] {
        for value in [true, false] {
            let payload = encode(&map, oid::BOOL, format, &Value::BoolValue(Bool::from(value)));
            let mut out = Bool::default();
            map.scan(
                oid::BOOL,
                format,
                payload.as_deref(),
                &mut ScanTarget::BoolValue(&mut out),
            )
            .unwrap();
            assert_eq!(out, Bool::from(value));
        }
    }
}

#[test]
fn int8_roundtrip_both_formats() {
    let map = Map::new();
    for format in [FormatCode::Binary, FormatCode::Text] {
        for value in [0, 1, -1, i64::MAX, i64::MIN] {
            let payload = encode(&map, oid::INT8, format, &Value::Int8Value(Int8::from(value)));
            let mut out = Int8::default();
            map.scan(
                oid::INT8,
                format,
                payload.as_deref(),
                &mut ScanTarget::Int8Value(&mut out),
            )
            .unwrap();
            assert_eq!(out, Int8::from(value));
        }
    }
}

#[test]
fn float8_roundtrip_both_formats() {
    let map = Map::new();
    for format in [FormatCode::Binary, FormatCode::Text] {
        for value in [0.0, 1.5, -2.25, 1e300, f64::MIN_POSITIVE] {
            let payload = encode(
                &map,
                oid::FLOAT8,
                format,
                &Value::Float8Value(Float8::from(value)),
            );
            let mut out = Float8::default();
            map.scan(
                oid::FLOAT8,
                format,
                payload.as_deref(),
                &mut ScanTarget::Float8Value(&mut out),
            )
            .unwrap();
            assert_eq!(out, Float8::from(value));
        }
    }
}

#[test]
fn text_roundtrip_both_formats() {
    let map = Map::new();
    for format in [FormatCode::Binary, FormatCode::Text] {
        for value in ["", "hello", "ünïcodé"] {
            let text = Text::from(value);
            let payload = encode(&map, oid::TEXT, format, &Value::TextValue(&text));
            let mut out = Text::default();
            map.scan(
                oid::TEXT,
                format,
                payload.as_deref(),
                &mut ScanTarget::TextValue(&mut out),
            )
            .unwrap();
            assert_eq!(out, text);
        }
    }
}

#[test]
fn timestamptz_roundtrip_binary() {
    let map = Map::new();
    for ts in [
        Timestamptz::from(instant("2000-01-01T00:00:00Z")),
        Timestamptz::from(instant("2024-03-15T12:00:00.123456Z")),
        Timestamptz::from(instant("1969-12-31T23:59:59.999999Z")),
        Timestamptz::infinity(),
        Timestamptz::negative_infinity(),
        Timestamptz::default(),
    ] {
        let payload = encode(
            &map,
            oid::TIMESTAMPTZ,
            FormatCode::Binary,
            &Value::TimestamptzValue(ts),
        );
        let mut out = Timestamptz::from(instant("1990-01-01T00:00:00Z"));
        map.scan(
            oid::TIMESTAMPTZ,
            FormatCode::Binary,
            payload.as_deref(),
            &mut ScanTarget::TimestamptzValue(&mut out),
        )
        .unwrap();
        assert_eq!(out, ts);
    }
}

#[test]
fn timestamptz_roundtrip_text_truncates_to_micros() {
    let map = Map::new();
    let sub_micro = Timestamptz::from(instant("2024-03-15T12:00:00.123456789Z"));
    let payload = encode(
        &map,
        oid::TIMESTAMPTZ,
        FormatCode::Text,
        &Value::TimestamptzValue(sub_micro),
    )
    .unwrap();

    let mut out = Timestamptz::default();
    map.scan(
        oid::TIMESTAMPTZ,
        FormatCode::Text,
        Some(&payload),
        &mut ScanTarget::TimestamptzValue(&mut out),
    )
    .unwrap();
    assert_eq!(
        out,
        Timestamptz::from(instant("2024-03-15T12:00:00.123456Z"))
    );
}

#[test]
fn null_idempotence() {
    let map = Map::new();

    // Encoding an invalid wrapper yields no payload.
    assert_eq!(
        encode(
            &map,
            oid::FLOAT8,
            FormatCode::Binary,
            &Value::Float8Value(Float8::default())
        ),
        None
    );

    // Decoding no payload yields an invalid wrapper.
    let mut out = Float8::from(5.0);
    map.scan(
        oid::FLOAT8,
        FormatCode::Binary,
        None,
        &mut ScanTarget::Float8Value(&mut out),
    )
    .unwrap();
    assert_eq!(out, Float8::default());
}

#[test]
fn fixed_width_payloads() {
    let map = Map::new();

    let bool_payload = encode(&map, oid::BOOL, FormatCode::Binary, &Value::Bool(true)).unwrap();
    assert_eq!(bool_payload.len(), 1);

    let float_payload =
        encode(&map, oid::FLOAT8, FormatCode::Binary, &Value::Float8(0.5)).unwrap();
    assert_eq!(float_payload.len(), 8);

    let ts_payload = encode(
        &map,
        oid::TIMESTAMPTZ,
        FormatCode::Binary,
        &Value::Timestamptz(instant("2024-03-15T12:00:00Z")),
    )
    .unwrap();
    assert_eq!(ts_payload.len(), 8);

    let int_payload = encode(&map, oid::INT8, FormatCode::Binary, &Value::Int8(1)).unwrap();
    assert_eq!(int_payload.len(), 8);
}

#[test]
fn wrong_width_binary_payload_is_rejected_by_every_fixed_width_codec() {
    let map = Map::new();
    let short = [0_u8; 3];

    let mut b = Bool::default();
    assert!(matches!(
        map.scan(
            oid::BOOL,
            FormatCode::Binary,
            Some(&short),
            &mut ScanTarget::BoolValue(&mut b)
        ),
        Err(Error::InvalidLength { len: 3, .. })
    ));

    let mut i = Int8::default();
    assert!(matches!(
        map.scan(
            oid::INT8,
            FormatCode::Binary,
            Some(&short),
            &mut ScanTarget::Int8Value(&mut i)
        ),
        Err(Error::InvalidLength { len: 3, .. })
    ));

    let mut f = Float8::default();
    assert!(matches!(
        map.scan(
            oid::FLOAT8,
            FormatCode::Binary,
            Some(&short),
            &mut ScanTarget::Float8Value(&mut f)
        ),
        Err(Error::InvalidLength { len: 3, .. })
    ));

    let mut t = Timestamptz::default();
    assert!(matches!(
        map.scan(
            oid::TIMESTAMPTZ,
            FormatCode::Binary,
            Some(&short),
            &mut ScanTarget::TimestamptzValue(&mut t)
        ),
        Err(Error::InvalidLength { len: 3, .. })
    ));
}

#[test]
fn float8_into_int64_target() {
    let map = Map::new();

    // Exactly integral doubles land in the integer target.
    let mut out = Int8::default();
    map.scan(
        oid::FLOAT8,
        FormatCode::Binary,
        Some(&3.0_f64.to_be_bytes()),
        &mut ScanTarget::Int8Value(&mut out),
    )
    .unwrap();
    assert_eq!(out, Int8::from(3));

    // Fractional doubles do not.
    let err = map
        .scan(
            oid::FLOAT8,
            FormatCode::Text,
            Some(b"1.5"),
            &mut ScanTarget::Int8Value(&mut out),
        )
        .unwrap_err();
    assert!(matches!(err, Error::LossyConversion { .. }));
}

#[test]
fn timestamptz_text_scan_matches_json_form() {
    let map = Map::new();
    let mut out = Timestamptz::default();
    map.scan(
        oid::TIMESTAMPTZ,
        FormatCode::Text,
        Some(b"2024-03-15 12:00:00+00:00"),
        &mut ScanTarget::TimestamptzValue(&mut out),
    )
    .unwrap();
    assert_eq!(out.time, instant("2024-03-15T12:00:00Z"));

    let json = serde_json::to_string(&out).unwrap();
    assert_eq!(json, "\"2024-03-15T12:00:00Z\"");
    assert_eq!(serde_json::from_str::<Timestamptz>(&json).unwrap(), out);
}
