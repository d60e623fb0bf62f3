use perc_transcoder::{
    build, BitBuffer, BitStringValue, Codec, CodecErrorType, FieldSchema, IntegerConstraints,
    SchemaNode, SizeConstraints, StringKind, Value,
};

fn encoded(codec: &Codec, value: &Value) -> Vec<u8> {
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, value).unwrap();
    buf.to_bytes()
}

fn assert_round_trip(codec: &Codec, value: &Value) {
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, value).unwrap();
    let mut replay = BitBuffer::from_bytes_with_bit_length(&buf.to_bytes(), buf.bit_length());
    assert_eq!(&codec.decode(&mut replay).unwrap(), value);
    assert_eq!(replay.remaining(), 0);
}

#[test]
fn booleans_take_one_bit() {
    let codec = Codec::boolean();
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, &Value::Boolean(true)).unwrap();
    codec.encode(&mut buf, &Value::Boolean(false)).unwrap();
    assert_eq!(buf.bit_length(), 2);
    assert_eq!(buf.to_bytes(), vec![0x80]);
}

#[test]
fn integer_constraint_shapes_round_trip() {
    let shapes = [
        IntegerConstraints::default(),
        IntegerConstraints {
            min: Some(0),
            max: Some(255),
            ..Default::default()
        },
        IntegerConstraints {
            min: Some(-5),
            max: Some(5),
            ..Default::default()
        },
        IntegerConstraints {
            min: Some(23),
            max: None,
            ..Default::default()
        },
        IntegerConstraints {
            min: Some(0),
            max: Some(7),
            extensible: true,
        },
    ];
    for constraints in shapes {
        let codec = Codec::integer(constraints);
        for value in [-5i64, 0, 5, 42, 65000, -1_000_000] {
            let in_root = constraints.min.map_or(true, |min| value >= min)
                && constraints.max.map_or(true, |max| value <= max);
            if in_root || constraints.extensible {
                assert_round_trip(&codec, &Value::Integer(value));
            }
        }
    }
}

#[test]
fn single_valued_range_takes_no_bits() {
    let codec = Codec::integer(IntegerConstraints {
        min: Some(42),
        max: Some(42),
        ..Default::default()
    });
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, &Value::Integer(42)).unwrap();
    assert_eq!(buf.bit_length(), 0);
    let mut replay = BitBuffer::new();
    assert_eq!(codec.decode(&mut replay).unwrap(), Value::Integer(42));
}

#[test]
fn out_of_range_integer_is_rejected_and_buffer_untouched() {
    let codec = Codec::integer(IntegerConstraints {
        min: Some(0),
        max: Some(7),
        ..Default::default()
    });
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, &Value::Integer(3)).unwrap();
    let length = buf.bit_length();
    let error = codec.encode(&mut buf, &Value::Integer(8)).unwrap_err();
    assert_eq!(error.kind, CodecErrorType::ConstraintViolation);
    assert_eq!(buf.bit_length(), length);
}

#[test]
fn partial_composite_encode_is_rolled_back() {
    let codec = Codec::sequence(
        vec![
            perc_transcoder::uper::SequenceField::new("a", Codec::boolean()),
            perc_transcoder::uper::SequenceField::new(
                "b",
                Codec::integer(IntegerConstraints {
                    min: Some(0),
                    max: Some(7),
                    ..Default::default()
                }),
            ),
        ],
        None,
    );
    let mut buf = BitBuffer::new();
    let value = Value::record(&[("a", Value::Boolean(true)), ("b", Value::Integer(99))]);
    assert!(codec.encode(&mut buf, &value).is_err());
    assert_eq!(buf.bit_length(), 0);
}

#[test]
fn enumerated_round_trips_root_and_extension() {
    let codec = Codec::enumerated(
        vec!["red".into(), "green".into(), "blue".into()],
        Some(vec!["violet".into()]),
    );
    for name in ["red", "green", "blue", "violet"] {
        assert_round_trip(&codec, &Value::Text(name.into()));
    }
    let mut buf = BitBuffer::new();
    assert_eq!(
        codec
            .encode(&mut buf, &Value::Text("magenta".into()))
            .unwrap_err()
            .kind,
        CodecErrorType::ConstraintViolation
    );
}

#[test]
fn fixed_size_bit_string_has_no_determinant() {
    let codec = Codec::bit_string(SizeConstraints::fixed(8));
    let value = Value::Bits(BitStringValue {
        data: vec![0xA5],
        bit_length: 8,
    });
    assert_eq!(encoded(&codec, &value), vec![0xA5]);
    assert_round_trip(&codec, &value);
}

#[test]
fn unconstrained_bit_string_is_length_prefixed() {
    let codec = Codec::bit_string(SizeConstraints::default());
    let value = Value::Bits(BitStringValue {
        data: vec![0xA5],
        bit_length: 8,
    });
    assert_eq!(encoded(&codec, &value), vec![0x08, 0xA5]);
    assert_round_trip(&codec, &value);
}

#[test]
fn bit_strings_keep_their_exact_bit_length() {
    let codec = Codec::bit_string(SizeConstraints::range(1, 63));
    let value = Value::Bits(BitStringValue {
        data: vec![0b1011_0000],
        bit_length: 4,
    });
    assert_round_trip(&codec, &value);
}

#[test]
fn octet_strings_round_trip() {
    for size in [
        SizeConstraints::default(),
        SizeConstraints::fixed(4),
        SizeConstraints::range(0, 8),
        SizeConstraints {
            min: Some(0),
            max: Some(8),
            extensible: true,
            ..Default::default()
        },
    ] {
        let codec = Codec::octet_string(size);
        for bytes in [vec![1u8, 2, 3, 4], vec![0xFF; 4]] {
            assert_round_trip(&codec, &Value::Bytes(bytes));
        }
    }
}

#[test]
fn octet_strings_are_not_byte_aligned() {
    // One leading bit forces every content byte to straddle two
    // stream bytes.
    let sequence = Codec::sequence(
        vec![
            perc_transcoder::uper::SequenceField::new("flag", Codec::boolean()),
            perc_transcoder::uper::SequenceField::new(
                "body",
                Codec::octet_string(SizeConstraints::fixed(2)),
            ),
        ],
        None,
    );
    let value = Value::record(&[
        ("flag", Value::Boolean(true)),
        ("body", Value::Bytes(vec![0xFF, 0x00])),
    ]);
    assert_eq!(encoded(&sequence, &value), vec![0xFF, 0x80, 0x00]);
    assert_round_trip(&sequence, &value);
}

#[test]
fn ia5_strings_compact_to_seven_bits() {
    let codec = Codec::character_string(StringKind::Ia5, SizeConstraints::range(0, 64), None)
        .unwrap();
    assert_round_trip(&codec, &Value::Text("Hello, World!".into()));
    // 5 characters at 7 bits plus the 7-bit count.
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, &Value::Text("hello".into())).unwrap();
    assert_eq!(buf.bit_length(), 7 + 35);
}

#[test]
fn visible_strings_reject_control_characters() {
    let codec =
        Codec::character_string(StringKind::Visible, SizeConstraints::default(), None).unwrap();
    assert_round_trip(&codec, &Value::Text("printable text".into()));
    let mut buf = BitBuffer::new();
    assert_eq!(
        codec
            .encode(&mut buf, &Value::Text("line\nbreak".into()))
            .unwrap_err()
            .kind,
        CodecErrorType::ConstraintViolation
    );
}

#[test]
fn utf8_strings_are_byte_length_framed() {
    let codec =
        Codec::character_string(StringKind::Utf8, SizeConstraints::default(), None).unwrap();
    assert_round_trip(&codec, &Value::Text("héllo €".into()));
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, &Value::Text("ab".into())).unwrap();
    assert_eq!(buf.to_bytes(), vec![0x02, b'a', b'b']);
}

#[test]
fn custom_alphabets_compact_to_their_index_width() {
    let codec = Codec::character_string(
        StringKind::Ia5,
        SizeConstraints::range(0, 16),
        Some("0123456789"),
    )
    .unwrap();
    assert_round_trip(&codec, &Value::Text("0420".into()));
    // 4 characters at 4 bits each plus the 5-bit count.
    let mut buf = BitBuffer::new();
    codec.encode(&mut buf, &Value::Text("0420".into())).unwrap();
    assert_eq!(buf.bit_length(), 5 + 16);
    let mut buf = BitBuffer::new();
    assert!(codec.encode(&mut buf, &Value::Text("ab".into())).is_err());
}

#[test]
fn object_identifiers_round_trip() {
    let codec = Codec::object_identifier();
    for arcs in [
        vec![1u64, 2, 840, 113549, 1, 1, 11],
        vec![2, 999, 1],
        vec![0, 39],
    ] {
        assert_round_trip(&codec, &Value::Oid(arcs));
    }
}

#[test]
fn object_identifier_arc_rules_are_enforced() {
    let codec = Codec::object_identifier();
    let mut buf = BitBuffer::new();
    for arcs in [vec![3u64, 1], vec![1], vec![0, 40]] {
        assert_eq!(
            codec.encode(&mut buf, &Value::Oid(arcs)).unwrap_err().kind,
            CodecErrorType::ConstraintViolation
        );
    }
}

#[test]
fn rsa_oid_has_the_canonical_content_octets() {
    let codec = Codec::object_identifier();
    let value = Value::Oid(vec![1, 2, 840, 113549, 1, 1, 11]);
    assert_eq!(
        encoded(&codec, &value),
        vec![0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B]
    );
}

#[test]
fn defaults_elide_to_a_single_preamble_byte() {
    let schema = SchemaNode::Sequence {
        fields: vec![
            FieldSchema::with_default(
                "id",
                SchemaNode::Integer {
                    min: Some(0),
                    max: Some(255),
                    extensible: false,
                },
                serde_json::json!(5),
            ),
            FieldSchema::with_default(
                "name",
                SchemaNode::Ia5String {
                    fixed_size: None,
                    min_size: Some(0),
                    max_size: Some(64),
                    extensible: false,
                    alphabet: None,
                },
                serde_json::json!("hello"),
            ),
        ],
        extension_fields: None,
    };
    let codec = build(&schema).unwrap();

    let defaults = Value::record(&[
        ("id", Value::Integer(5)),
        ("name", Value::Text("hello".into())),
    ]);
    assert_eq!(encoded(&codec, &defaults), vec![0x00]);

    let mut replay = BitBuffer::from_bytes(&[0x00]);
    assert_eq!(codec.decode(&mut replay).unwrap(), defaults);

    let other = Value::record(&[
        ("id", Value::Integer(42)),
        ("name", Value::Text("world".into())),
    ]);
    assert_eq!(
        encoded(&codec, &other),
        vec![0xCA, 0x82, 0xF7, 0xDF, 0xCB, 0x66, 0x40]
    );
    assert_round_trip(&codec, &other);
}

#[test]
fn missing_mandatory_fields_are_rejected() {
    let codec = Codec::sequence(
        vec![perc_transcoder::uper::SequenceField::new(
            "a",
            Codec::boolean(),
        )],
        None,
    );
    let mut buf = BitBuffer::new();
    assert_eq!(
        codec.encode(&mut buf, &Value::record(&[])).unwrap_err().kind,
        CodecErrorType::ConstraintViolation
    );
}

#[test]
fn unknown_fields_are_rejected() {
    let codec = Codec::sequence(
        vec![perc_transcoder::uper::SequenceField::new(
            "a",
            Codec::boolean(),
        )],
        None,
    );
    let mut buf = BitBuffer::new();
    let value = Value::record(&[("a", Value::Boolean(true)), ("b", Value::Boolean(false))]);
    assert!(codec.encode(&mut buf, &value).is_err());
}

#[test]
fn sequence_of_round_trips_with_size_shapes() {
    let item = Codec::integer(IntegerConstraints {
        min: Some(0),
        max: Some(255),
        ..Default::default()
    });
    for size in [
        SizeConstraints::default(),
        SizeConstraints::fixed(3),
        SizeConstraints::range(0, 10),
    ] {
        let codec = Codec::sequence_of(item.clone(), size);
        let value = Value::List(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
        ]);
        assert_round_trip(&codec, &value);
    }
}

#[test]
fn empty_sequence_of_is_fine_when_unconstrained() {
    let codec = Codec::sequence_of(Codec::boolean(), SizeConstraints::default());
    assert_round_trip(&codec, &Value::List(vec![]));
}

#[test]
fn choice_alternatives_round_trip() {
    let codec = Codec::choice(
        vec![
            perc_transcoder::uper::ChoiceAlternative::new("flag", Codec::boolean()),
            perc_transcoder::uper::ChoiceAlternative::new(
                "count",
                Codec::integer(IntegerConstraints {
                    min: Some(0),
                    max: Some(255),
                    ..Default::default()
                }),
            ),
        ],
        None,
    );
    assert_round_trip(&codec, &Value::choice("flag", Value::Boolean(true)));
    assert_round_trip(&codec, &Value::choice("count", Value::Integer(200)));
    let mut buf = BitBuffer::new();
    assert_eq!(
        codec
            .encode(&mut buf, &Value::choice("other", Value::Null))
            .unwrap_err()
            .kind,
        CodecErrorType::ConstraintViolation
    );
}

#[test]
fn single_alternative_choice_spends_no_index_bits() {
    let codec = Codec::choice(
        vec![perc_transcoder::uper::ChoiceAlternative::new(
            "only",
            Codec::boolean(),
        )],
        None,
    );
    let mut buf = BitBuffer::new();
    codec
        .encode(&mut buf, &Value::choice("only", Value::Boolean(true)))
        .unwrap();
    assert_eq!(buf.bit_length(), 1);
}

#[test]
fn decoding_random_bytes_never_panics() {
    let codecs = [
        Codec::boolean(),
        Codec::integer(IntegerConstraints::default()),
        Codec::integer(IntegerConstraints {
            min: Some(0),
            max: Some(7),
            extensible: true,
        }),
        Codec::enumerated(vec!["a".into(), "b".into()], Some(vec![])),
        Codec::bit_string(SizeConstraints::default()),
        Codec::octet_string(SizeConstraints::range(0, 16)),
        Codec::character_string(StringKind::Ia5, SizeConstraints::default(), None).unwrap(),
        Codec::object_identifier(),
        Codec::sequence_of(Codec::boolean(), SizeConstraints::default()),
    ];
    // Low-grade generator, enough to sweep varied prefixes.
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    for _ in 0..200 {
        let mut bytes = Vec::new();
        for _ in 0..(state % 24) {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            bytes.push((state >> 56) as u8);
        }
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        for codec in &codecs {
            let mut buf = BitBuffer::from_bytes(&bytes);
            // Either outcome is fine, as long as it is a typed result.
            let _ = codec.decode(&mut buf);
        }
    }
}

#[test]
fn failed_decode_restores_the_cursor() {
    let codec = Codec::octet_string(SizeConstraints::default());
    // Length determinant promises 200 bytes, buffer holds 2.
    let mut buf = BitBuffer::from_bytes(&[0x80, 0xC8, 0xAB]);
    let error = codec.decode(&mut buf).unwrap_err();
    assert_eq!(error.kind, CodecErrorType::BufferUnderrun);
    assert_eq!(buf.cursor(), 0);
}
