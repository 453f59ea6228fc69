// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Text {
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    address: Address,
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    zip: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Point {
    x: i32,
    y: i32,
    label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Sample {
    id: u64,
    level: i16,
    ok: bool,
    ratio: f32,
}

#[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
struct Reading {
    #[prost(string, tag = "1")]
    sensor: String,
    #[prost(int64, tag = "2")]
    value: i64,
}

crate::record!(Text, Profile, Point, Person, Sample);
crate::protobuf_record!(Reading);

fn profile() -> Profile {
    Profile {
        name: "ada".into(),
        address: Address {
            city: "london".into(),
            zip: 12345,
        },
        tags: vec!["math".into(), "engines".into()],
    }
}

fn reading() -> Reading {
    Reading {
        sensor: "t1".into(),
        value: -42,
    }
}

fn sample() -> Sample {
    Sample {
        id: 9,
        level: -3,
        ok: true,
        ratio: 0.25,
    }
}

fn round_trip<P: Payload + PartialEq + std::fmt::Debug>(codec: Codec, value: &P) {
    let data = value.encode_with(&codec).unwrap_or_else(|e| panic!("{} encode: {}", codec, e));
    let back = P::decode_with(&codec, &data).unwrap_or_else(|e| panic!("{} decode: {}", codec, e));
    assert_eq!(&back, value, "round trip through {}", codec);
}

#[test]
fn test_every_registered_codec_round_trips() {
    let bytes = b"hello, world \x00\xff".to_vec();

    for (name, codec) in registry().codecs() {
        if codec.accepts_bytes() {
            round_trip(codec, &bytes);
        }
        if !codec.accepts_records() {
            continue;
        }
        match codec {
            Codec::Json | Codec::Yaml | Codec::Hash => round_trip(codec, &profile()),
            Codec::Xml => round_trip(
                codec,
                &Point {
                    x: 3,
                    y: -4,
                    label: "origin".into(),
                },
            ),
            Codec::Csv { headers: false } => round_trip(
                codec,
                &vec![
                    vec!["a".to_string(), "1".to_string()],
                    vec!["b".to_string(), "2".to_string()],
                ],
            ),
            Codec::Csv { headers: true } => round_trip(
                codec,
                &vec![
                    Person {
                        name: "ada".into(),
                        age: 36,
                    },
                    Person {
                        name: "alan".into(),
                        age: 41,
                    },
                ],
            ),
            Codec::Protobuf => round_trip(codec, &reading()),
            Codec::Binary(_) => round_trip(codec, &sample()),
            other => panic!("no sample for {} ({})", other, name),
        }
    }
}

#[test]
fn test_json_base64_lazy_reverse_law() {
    let chain = Chain::parse("json.base64.lazy").unwrap();
    let value = Text { text: "hi".into() };
    let wire = chain.marshal(&value).unwrap();
    assert_eq!(wire, b"eyJ0ZXh0IjoiaGkifQ==".to_vec());
    let back: Text = chain.reverse().unmarshal(&wire).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_reverse_law_across_chains() {
    let bytes = b"\x01\x02binary\x03".to_vec();
    let bytes_chain = Chain::parse("lazy.base64-url.protobuf.base64").unwrap();
    let back: Vec<u8> = bytes_chain
        .reverse()
        .unmarshal(&bytes_chain.marshal(&bytes).unwrap())
        .unwrap();
    assert_eq!(back, bytes);

    let proto_chain = Chain::parse("protobuf.base64").unwrap();
    let back: Reading = proto_chain
        .reverse()
        .unmarshal(&proto_chain.marshal(&reading()).unwrap())
        .unwrap();
    assert_eq!(back, reading());

    let hash_chain = Chain::parse("hash.base64-url").unwrap();
    let back: Profile = hash_chain
        .reverse()
        .unmarshal(&hash_chain.marshal(&profile()).unwrap())
        .unwrap();
    assert_eq!(back, profile());

    let binary_chain = Chain::parse("little-endian.base64").unwrap();
    let back: Sample = binary_chain
        .reverse()
        .unmarshal(&binary_chain.marshal(&sample()).unwrap())
        .unwrap();
    assert_eq!(back, sample());
}

#[test]
fn test_asymmetric_chain_reverse_law() {
    // encoder and decoder lists differ; only the reverse pairing matters
    let chain = Chain::new(
        vec![Codec::Yaml, Codec::Base64 { url: true }],
        vec![Codec::Lazy],
    );
    let wire = chain.marshal(&profile()).unwrap();
    let back: Profile = chain.reverse().unmarshal(&wire).unwrap();
    assert_eq!(back, profile());
}

#[test]
fn test_missing_encoding_in_chain() {
    let err = Chain::parse("json.gzip").unwrap_err();
    assert!(matches!(err, crate::errors::EncodingError::MissingEncoding(_)));
}
