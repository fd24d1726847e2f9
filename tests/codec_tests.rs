//! Serializer registry behaviour through the public API.
//!
//! Round-trips the shapes handlers actually exchange (empty string, string
//! map, single-field struct) through every built-in codec, plugs in a custom
//! YAML codec, and checks the negotiation fallback end to end.

mod common;

use common::requests;
use http::{Method, StatusCode};
use pathways::codec::{ApiError, Codec, SerializerRegistry, ValueCodec, JSON, MSGPACK, POSTCARD};
use pathways::error::CodecError;
use pathways::router::Service;
use pathways::server::BufferedResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Named {
    name: String,
}

fn round_trip<T>(registry: &SerializerRegistry, content_type: &str, value: &T) -> T
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let mut buf = Vec::new();
    registry.encode(content_type, &mut buf, value).unwrap();
    registry.decode(content_type, &buf[..]).unwrap()
}

#[test]
fn test_builtin_codecs_round_trip() {
    let registry = SerializerRegistry::default();
    let map: BTreeMap<String, String> = [("a", "1"), ("b", "two")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let named = Named {
        name: "rex".to_string(),
    };

    for content_type in [JSON, MSGPACK, POSTCARD] {
        assert_eq!(round_trip(&registry, content_type, &String::new()), "");
        assert_eq!(round_trip(&registry, content_type, &map), map);
        assert_eq!(round_trip(&registry, content_type, &named), named);
    }
}

#[test]
fn test_msgpack_writes_structs_as_maps() {
    let bytes = Codec::MsgPack
        .to_vec(&Named {
            name: "x".to_string(),
        })
        .unwrap();
    // fixmap of one entry, then the fixstr key "name"
    assert_eq!(bytes[0], 0x81);
    assert_eq!(&bytes[1..6], b"\xa4name");
}

/// YAML through the `serde_json::Value` bridge.
struct Yaml;

impl ValueCodec for Yaml {
    fn encode_value(&self, value: &Value, sink: &mut dyn Write) -> Result<(), CodecError> {
        let text = serde_yaml::to_string(value).map_err(|e| CodecError::Custom(e.to_string()))?;
        sink.write_all(text.as_bytes())?;
        Ok(())
    }

    fn decode_value(&self, source: &mut dyn Read) -> Result<Value, CodecError> {
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        serde_yaml::from_str(&text).map_err(|e| CodecError::Custom(e.to_string()))
    }
}

#[test]
fn test_custom_codec_plugs_in() {
    let registry = SerializerRegistry::builder()
        .codec("application/yaml", Codec::Custom(Arc::new(Yaml)))
        .codec(JSON, Codec::Json)
        .build()
        .unwrap();

    let mut buf = Vec::new();
    registry
        .encode(
            "application/yaml",
            &mut buf,
            &Named {
                name: "rex".to_string(),
            },
        )
        .unwrap();
    assert_eq!(String::from_utf8(buf.clone()).unwrap(), "name: rex\n");

    let back: Named = registry.decode("application/yaml", &buf[..]).unwrap();
    assert_eq!(back.name, "rex");

    let err = registry
        .decode::<Named, _>("application/yaml", &b"name: [unclosed"[..])
        .unwrap_err();
    assert!(matches!(err, CodecError::Custom(_)));
}

#[test]
fn test_custom_codec_negotiated_by_service() {
    let registry = SerializerRegistry::builder()
        .codec("application/yaml", Codec::Custom(Arc::new(Yaml)))
        .codec(JSON, Codec::Json)
        .build()
        .unwrap();
    let mut service = Service::with_registry("/", Arc::new(registry));
    service.path("/pet").get().action(|cx| {
        cx.api_response(
            StatusCode::OK,
            Named {
                name: "rex".to_string(),
            },
        )
    });

    let response = service.handle(requests::with_body(
        Method::GET,
        "/pet",
        &[("Accept", "application/yaml")],
        Vec::new(),
    ));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/yaml");
    assert_eq!(response.body(), b"name: rex\n");
}

#[test]
fn test_unknown_accept_falls_back_to_json_400() {
    let mut service = Service::new("/");
    service
        .path("/pet")
        .get()
        .action(|cx| cx.api_response(StatusCode::OK, "rex"));

    let response = service.handle(requests::with_body(
        Method::GET,
        "/pet",
        &[("Accept", "text/csv")],
        Vec::new(),
    ));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], JSON);
    let body: ApiError = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(
        body,
        ApiError {
            status: 200,
            error: "Invalid content type text/csv".to_string(),
        }
    );
}

#[test]
fn test_fallback_also_returns_the_error() {
    let registry = SerializerRegistry::default();
    let mut sink = BufferedResponse::new();
    let err = registry
        .encode_response(&mut sink, StatusCode::CREATED, "text/csv", &"x")
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid content type text/csv");
    assert_eq!(sink.status, StatusCode::BAD_REQUEST);
    let body: ApiError = serde_json::from_slice(&sink.body).unwrap();
    assert_eq!(body.status, 201);
}

#[test]
fn test_accept_drives_negotiation() {
    let mut service = Service::new("/");
    service
        .path("/pet")
        .get()
        .action(|cx| cx.api_response(StatusCode::OK, "rex"));

    // Accept */* defers to the registry default, not to Content-Type
    let response = service.handle(requests::with_body(
        Method::GET,
        "/pet",
        &[("Accept", "*/*"), ("Content-Type", MSGPACK)],
        Vec::new(),
    ));
    assert_eq!(response.headers()["content-type"], JSON);

    let response = service.handle(requests::with_body(
        Method::GET,
        "/pet",
        &[("Accept", MSGPACK)],
        Vec::new(),
    ));
    assert_eq!(response.headers()["content-type"], MSGPACK);
    let back: String = Codec::MsgPack.decode(response.body().as_slice()).unwrap();
    assert_eq!(back, "rex");
}
